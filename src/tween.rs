//! Per-frame approach of animated values toward their targets.
//!
//! Every animated visual property (bar height, material color, widget scale,
//! pivot rotation) is an [`AnimatedValue`]. The frame loop is the only writer of
//! `current`; anything else only moves `target`, and the next [`AnimatedValue::step`]
//! redirects motion toward it.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Once a value is this close to its target it snaps onto it and stops moving.
pub const SETTLE_EPSILON: f32 = 1e-4;

pub trait Lerp: Copy + PartialEq {
    fn lerp_to(self, target: Self, t: f32) -> Self;
    /// Largest per-channel distance to `other`.
    fn max_channel_distance(self, other: Self) -> f32;
}

impl Lerp for f32 {
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    fn max_channel_distance(self, other: Self) -> f32 {
        (self - other).abs()
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    fn max_channel_distance(self, other: Self) -> f32 {
        (self - other).abs().max_element()
    }
}

// Colors are RGBA in whatever space the target is expressed in; no gamma here.
impl Lerp for Vec4 {
    fn lerp_to(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    fn max_channel_distance(self, other: Self) -> f32 {
        (self - other).abs().max_element()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// `current + (target - current) * min(1, rate * dt)`
    #[default]
    LinearClamped,
    /// `lerp(current, target, 1 - exp(-rate * dt))`, frame-rate independent.
    Exponential,
}

impl Easing {
    pub fn blend_factor(self, rate: f32, dt: f32) -> f32 {
        if !(rate > 0.0) || !(dt > 0.0) {
            return 0.0;
        }
        match self {
            Easing::LinearClamped => (rate * dt).min(1.0),
            Easing::Exponential => 1.0 - (-rate * dt).exp(),
        }
    }
}

pub fn approach<T: Lerp>(current: T, target: T, rate: f32, dt: f32, easing: Easing) -> T {
    let t = easing.blend_factor(rate, dt);
    if t >= 1.0 {
        return target;
    }
    current.lerp_to(target, t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedValue<T: Lerp> {
    current: T,
    target: T,
    rate: f32,
    easing: Easing,
}

impl<T: Lerp> AnimatedValue<T> {
    pub fn new(value: T, rate: f32) -> Self {
        Self { current: value, target: value, rate, easing: Easing::default() }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    /// Jumps straight to `value` with no motion left.
    pub fn snap_to(&mut self, value: T) {
        self.current = value;
        self.target = value;
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advances one frame. Returns `true` when `current` changed.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            return false;
        }
        if self.easing.blend_factor(self.rate, dt) <= 0.0 {
            return false;
        }
        let next = approach(self.current, self.target, self.rate, dt, self.easing);
        // A step below f32 resolution stalls short of the target; land on it instead.
        let stalled = next == self.current;
        let next =
            if stalled || next.max_channel_distance(self.target) <= SETTLE_EPSILON { self.target } else { next };
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_within_two_seconds_at_bar_rate() {
        let mut height = AnimatedValue::new(0.0_f32, 8.0);
        height.set_target(10.0);
        let dt = 1.0 / 60.0;
        for _ in 0..120 {
            height.step(dt);
        }
        assert!((height.current() - 10.0).abs() < 0.01, "height = {}", height.current());
    }

    #[test]
    fn settled_value_reports_no_change() {
        let mut scale = AnimatedValue::new(Vec3::ONE, 10.0);
        assert!(!scale.step(0.016));
        scale.set_target(Vec3::splat(1.1));
        for _ in 0..400 {
            scale.step(0.016);
        }
        assert!(scale.is_settled());
        assert_eq!(scale.current(), Vec3::splat(1.1));
        assert!(!scale.step(0.016));
    }

    #[test]
    fn large_values_settle_despite_f32_resolution() {
        let mut height = AnimatedValue::new(0.0_f32, 1.0);
        height.set_target(583.392_33);
        for _ in 0..3000 {
            height.step(1.0 / 60.0);
        }
        assert!(height.is_settled(), "stalled at {}", height.current());
        assert_eq!(height.current(), 583.392_33);
    }

    #[test]
    fn large_step_lands_on_target() {
        let mut color = AnimatedValue::new(Vec4::ZERO, 10.0);
        color.set_target(Vec4::new(1.0, 0.5, 0.25, 1.0));
        assert!(color.step(0.5));
        assert_eq!(color.current(), color.target());
    }

    #[test]
    fn exponential_easing_is_slower_than_linear_for_same_step() {
        let linear = approach(0.0_f32, 1.0, 8.0, 0.05, Easing::LinearClamped);
        let exponential = approach(0.0_f32, 1.0, 8.0, 0.05, Easing::Exponential);
        assert!(exponential < linear);
        assert!(exponential > 0.0);
    }

    #[test]
    fn zero_or_negative_dt_holds_value() {
        assert_eq!(approach(2.0_f32, 5.0, 8.0, 0.0, Easing::LinearClamped), 2.0);
        assert_eq!(approach(2.0_f32, 5.0, 8.0, -1.0, Easing::Exponential), 2.0);
        assert_eq!(approach(2.0_f32, 5.0, f32::NAN, 0.1, Easing::LinearClamped), 2.0);
    }
}
