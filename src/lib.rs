pub mod animation;
pub mod app;
pub mod audio;
pub mod camera3d;
pub mod cli;
pub mod config;
pub mod deck;
pub mod ecs;
pub mod events;
pub mod feedback;
pub mod idle;
pub mod input;
pub mod navigation;
pub mod oscillation;
pub mod picking;
pub mod report;
pub mod scene;
pub mod time;
pub mod tween;

pub use app::{run, RunSummary};
pub use deck::{Deck, DeckCollaborators, FrameStats};

/// Wraps into `[-PI, PI)`. Non-finite input maps to zero.
pub(crate) fn wrap_angle(radians: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !radians.is_finite() {
        return 0.0;
    }
    (radians + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::wrap_angle;
    use std::f32::consts::PI;

    #[test]
    fn wraps_into_a_single_turn() {
        assert!((wrap_angle(3.0 * PI) - -PI).abs() < 1e-5 || (wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) - -0.5).abs() < 1e-6);
        assert!((wrap_angle(2.0 * PI + 0.25) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn huge_and_non_finite_angles_return_immediately() {
        for raw in [1e12_f32, -3e9, f32::MAX, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let wrapped = wrap_angle(raw);
            assert!(wrapped.is_finite());
            assert!((-PI..=PI).contains(&wrapped), "{raw} wrapped to {wrapped}");
        }
    }
}
