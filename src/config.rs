use crate::audio::AudioAssets;
use crate::input::InputConfig;
use crate::oscillation::{OscillationConfig, OscillationMode};
use crate::tween::Easing;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "CameraConfig::default_fov")]
    pub fov_y_degrees: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
    #[serde(default = "CameraConfig::default_viewport")]
    pub viewport: [u32; 2],
}

impl CameraConfig {
    const fn default_position() -> [f32; 3] {
        [0.0, 0.0, 14.0]
    }

    const fn default_fov() -> f32 {
        50.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        200.0
    }

    const fn default_viewport() -> [u32; 2] {
        [1280, 720]
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Self::default_position(),
            target: [0.0; 3],
            fov_y_degrees: Self::default_fov(),
            near: Self::default_near(),
            far: Self::default_far(),
            viewport: Self::default_viewport(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdleConfig {
    #[serde(default = "IdleConfig::default_grace_ms")]
    pub grace_ms: u64,
}

impl IdleConfig {
    const fn default_grace_ms() -> u64 {
        5000
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self { grace_ms: Self::default_grace_ms() }
    }
}

/// Approach rates per visual property, in 1/s.
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    #[serde(default = "RateConfig::default_bar_height")]
    pub bar_height: f32,
    #[serde(default = "RateConfig::default_hover_color")]
    pub hover_color: f32,
    #[serde(default = "RateConfig::default_button_scale")]
    pub button_scale: f32,
    #[serde(default = "RateConfig::default_rotation")]
    pub rotation: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl RateConfig {
    const fn default_bar_height() -> f32 {
        8.0
    }

    const fn default_hover_color() -> f32 {
        10.0
    }

    const fn default_button_scale() -> f32 {
        10.0
    }

    const fn default_rotation() -> f32 {
        4.0
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            bar_height: Self::default_bar_height(),
            hover_color: Self::default_hover_color(),
            button_scale: Self::default_button_scale(),
            rotation: Self::default_rotation(),
            easing: Easing::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub hover_cue: Option<PathBuf>,
    #[serde(default)]
    pub click_cue: Option<PathBuf>,
    #[serde(default)]
    pub music: Option<PathBuf>,
    #[serde(default = "AudioConfig::default_music_volume")]
    pub music_volume: f32,
    #[serde(default = "AudioConfig::default_start_muted")]
    pub start_muted: bool,
    #[serde(default = "AudioConfig::default_cue_log_capacity")]
    pub cue_log_capacity: usize,
}

impl AudioConfig {
    const fn default_music_volume() -> f32 {
        0.3
    }

    const fn default_start_muted() -> bool {
        true
    }

    const fn default_cue_log_capacity() -> usize {
        32
    }

    pub fn assets(&self) -> AudioAssets {
        AudioAssets {
            hover_cue: self.hover_cue.clone(),
            click_cue: self.click_cue.clone(),
            music: self.music.clone(),
            music_volume: self.music_volume,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            hover_cue: None,
            click_cue: None,
            music: None,
            music_volume: Self::default_music_volume(),
            start_muted: Self::default_start_muted(),
            cue_log_capacity: Self::default_cue_log_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeckConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub oscillation: OscillationConfig,
    #[serde(default)]
    pub rates: RateConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckConfigOverrides {
    pub amplitude_degrees: Option<f32>,
    pub oscillation_mode: Option<OscillationMode>,
    pub grace_ms: Option<u64>,
}

impl DeckConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(target: "config", "config load error: {err:#}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &DeckConfigOverrides) {
        if let Some(degrees) = overrides.amplitude_degrees {
            self.oscillation.amplitude_radians = degrees.to_radians();
        }
        if let Some(mode) = overrides.oscillation_mode {
            self.oscillation.mode = mode;
        }
        if let Some(grace_ms) = overrides.grace_ms {
            self.idle.grace_ms = grace_ms;
        }
    }
}

impl DeckConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.amplitude_degrees.is_none() && self.oscillation_mode.is_none() && self.grace_ms.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.amplitude_degrees.is_some() {
            fields.push("amplitude_degrees");
        }
        if self.oscillation_mode.is_some() {
            fields.push("oscillation_mode");
        }
        if self.grace_ms.is_some() {
            fields.push("grace_ms");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg: DeckConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg.idle.grace(), Duration::from_millis(5000));
        assert_eq!(cfg.rates.bar_height, 8.0);
        assert_eq!(cfg.camera.position, [0.0, 0.0, 14.0]);
        assert!(cfg.audio.start_muted);
        assert_eq!(cfg.oscillation.mode, OscillationMode::Bounded);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg: DeckConfig = serde_json::from_str(
            r#"{"oscillation": {"mode": "continuous"}, "rates": {"easing": "exponential", "bar_height": 4}}"#,
        )
        .expect("parse");
        assert_eq!(cfg.oscillation.mode, OscillationMode::Continuous);
        assert!((cfg.oscillation.angular_speed - 0.2).abs() < f32::EPSILON);
        assert_eq!(cfg.rates.easing, Easing::Exponential);
        assert_eq!(cfg.rates.bar_height, 4.0);
        assert_eq!(cfg.rates.hover_color, 10.0);
    }

    #[test]
    fn overrides_apply_on_top() {
        let mut cfg = DeckConfig::default();
        let overrides = DeckConfigOverrides {
            amplitude_degrees: Some(90.0),
            oscillation_mode: None,
            grace_ms: Some(100),
        };
        cfg.apply_overrides(&overrides);
        assert!((cfg.oscillation.amplitude_radians - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(cfg.idle.grace_ms, 100);
        assert_eq!(overrides.applied_fields(), vec!["amplitude_degrees", "grace_ms"]);
    }
}
