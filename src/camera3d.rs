use crate::wrap_angle;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

const DEFAULT_UP: Vec3 = Vec3::Y;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective camera looking at the presentation stage.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    /// World-space ray from the eye through a pixel of the viewport.
    pub fn screen_ray(&self, screen: Vec2, viewport: PhysicalSize<u32>) -> Option<(Vec3, Vec3)> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let ndc_x = (2.0 * screen.x / viewport.width as f32) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / viewport.height as f32);
        let aspect = viewport.width as f32 / viewport.height as f32;
        let inv_view_proj = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let world = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let dir = ((world.truncate() / world.w) - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        Some((self.position, dir))
    }
}

/// Yaw/pitch/radius around a fixed target, owned by the user while dragging.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
}

impl OrbitCamera {
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self { target, radius: radius.max(0.01), yaw_radians: 0.0, pitch_radians: 0.0 }
    }

    /// Orbit that reproduces a camera placed at `position` looking at `target`.
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(0.01);
        let yaw_radians = offset.x.atan2(offset.z);
        let pitch_radians = (-offset.y / radius).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self { target, radius, yaw_radians, pitch_radians }
    }

    pub fn to_camera(&self, fov_y_radians: f32, near: f32, far: f32) -> Camera3D {
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0);
        let offset = rotation * Vec3::new(0.0, 0.0, self.radius);
        Camera3D::new(self.target + offset, self.target, fov_y_radians, near, far)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw_radians = wrap_angle(self.yaw_radians + delta.x);
        self.pitch_radians = (self.pitch_radians + delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.radius = (self.radius * factor).clamp(0.1, 10_000.0);
    }
}

/// What the controls report to whoever tracks user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Start,
    Change,
    End,
}

/// Pointer-driven orbit controls over an [`OrbitCamera`].
#[derive(Debug, Clone)]
pub struct OrbitControls {
    orbit: OrbitCamera,
    dragging: bool,
    rotate_speed: f32,
    zoom_speed: f32,
}

impl OrbitControls {
    pub fn new(orbit: OrbitCamera) -> Self {
        Self { orbit, dragging: false, rotate_speed: 0.005, zoom_speed: 0.1 }
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) -> Option<ControlSignal> {
        if self.dragging {
            return None;
        }
        self.dragging = true;
        Some(ControlSignal::Start)
    }

    /// Pixel delta of the pointer while the button is held.
    pub fn drag(&mut self, delta: Vec2) -> Option<ControlSignal> {
        if !self.dragging || delta == Vec2::ZERO {
            return None;
        }
        self.orbit.orbit(-delta * self.rotate_speed);
        Some(ControlSignal::Change)
    }

    pub fn end_drag(&mut self) -> Option<ControlSignal> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(ControlSignal::End)
    }

    /// A wheel notch is a complete interaction on its own.
    pub fn wheel(&mut self, delta: f32) -> &'static [ControlSignal] {
        if delta == 0.0 || !delta.is_finite() {
            return &[];
        }
        self.orbit.zoom(1.0 - delta.signum() * self.zoom_speed);
        if self.dragging {
            &[ControlSignal::Change]
        } else {
            &[ControlSignal::Start, ControlSignal::Change, ControlSignal::End]
        }
    }
}
