use crate::animation::ElementId;
use glam::Vec3;

/// Axis-aligned box in world space used for pointer hit tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl HitBox {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn ray_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        ray_aabb_intersection(origin, dir, self.min, self.max).map(|(t, _)| t)
    }
}

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-6 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv_d = 1.0 / d;
        let mut t1 = (min[axis] - o) * inv_d;
        let mut t2 = (max[axis] - o) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    Some((t_hit, origin + dir * t_hit))
}

/// Every element hit by the ray, nearest first. Ties keep input order.
pub fn pick_all<'a>(
    origin: Vec3,
    dir: Vec3,
    candidates: impl IntoIterator<Item = (&'a ElementId, HitBox)>,
) -> Vec<(ElementId, f32)> {
    let mut hits: Vec<(ElementId, f32)> = candidates
        .into_iter()
        .filter_map(|(id, hit_box)| hit_box.ray_distance(origin, dir).map(|t| (id.clone(), t)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}
