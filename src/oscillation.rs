use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillationMode {
    /// Symmetric sweep `sin(t) * amplitude`.
    #[default]
    Bounded,
    /// Slow unbounded drift; the angle is the accumulated phase itself.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillationConfig {
    #[serde(default = "OscillationConfig::default_amplitude")]
    pub amplitude_radians: f32,
    #[serde(default = "OscillationConfig::default_angular_speed")]
    pub angular_speed: f32,
    #[serde(default)]
    pub mode: OscillationMode,
}

impl OscillationConfig {
    fn default_amplitude() -> f32 {
        25.0_f32.to_radians()
    }

    const fn default_angular_speed() -> f32 {
        0.2
    }
}

impl Default for OscillationConfig {
    fn default() -> Self {
        Self {
            amplitude_radians: Self::default_amplitude(),
            angular_speed: Self::default_angular_speed(),
            mode: OscillationMode::default(),
        }
    }
}

/// Accumulated oscillation phase. Only grows, and only while idle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationPhase {
    pub elapsed_time: f32,
}

#[derive(Debug, Clone, Resource)]
pub struct OscillatingRotation {
    config: OscillationConfig,
    phase: RotationPhase,
}

impl OscillatingRotation {
    pub fn new(config: OscillationConfig) -> Self {
        Self { config, phase: RotationPhase::default() }
    }

    pub fn config(&self) -> &OscillationConfig {
        &self.config
    }

    pub fn phase(&self) -> RotationPhase {
        self.phase
    }

    /// Moves the phase forward unless the user currently owns the view, then
    /// returns the angle for this frame. Interacting freezes the phase.
    pub fn advance(&mut self, dt: f32, interacting: bool) -> f32 {
        if !interacting && dt > 0.0 && dt.is_finite() {
            self.phase.elapsed_time += dt * self.config.angular_speed.abs();
        }
        self.angle()
    }

    pub fn angle(&self) -> f32 {
        angle_at(&self.config, self.phase.elapsed_time)
    }
}

impl Default for OscillatingRotation {
    fn default() -> Self {
        Self::new(OscillationConfig::default())
    }
}

pub fn angle_at(config: &OscillationConfig, elapsed_time: f32) -> f32 {
    match config.mode {
        OscillationMode::Bounded => elapsed_time.sin() * config.amplitude_radians.abs(),
        OscillationMode::Continuous => elapsed_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_freezes_while_interacting() {
        let mut rotation = OscillatingRotation::default();
        rotation.advance(1.0, false);
        let frozen = rotation.phase();
        let angle = rotation.angle();
        for _ in 0..10 {
            assert_eq!(rotation.advance(0.5, true), angle);
        }
        assert_eq!(rotation.phase(), frozen);
        rotation.advance(0.5, false);
        assert!(rotation.phase().elapsed_time > frozen.elapsed_time, "phase resumes, not reset");
    }

    #[test]
    fn phase_advances_at_speed_factor() {
        let mut rotation = OscillatingRotation::default();
        for _ in 0..10 {
            rotation.advance(0.1, false);
        }
        assert!((rotation.phase().elapsed_time - 0.2).abs() < 1e-5);
    }

    #[test]
    fn continuous_mode_drifts_past_amplitude() {
        let config = OscillationConfig { mode: OscillationMode::Continuous, ..OscillationConfig::default() };
        let mut rotation = OscillatingRotation::new(config);
        for _ in 0..100 {
            rotation.advance(1.0, false);
        }
        assert!(rotation.angle() > config.amplitude_radians);
    }
}
