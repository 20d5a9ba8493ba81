//! Tracks whether the user is manipulating the view.
//!
//! `on_interaction_start` flips to interacting immediately; `on_interaction_end`
//! arms a single grace timer, and only when that timer expires does the
//! detector report idle again. The timer is a deadline tagged with a
//! generation number. Every start or end bumps the generation first, so an
//! expiry carrying an older generation is ignored no matter when it arrives.

use bevy_ecs::prelude::Resource;
use std::time::Duration;

pub const DEFAULT_IDLE_GRACE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimerHandle {
    generation: u64,
    deadline: Duration,
}

impl IdleTimerHandle {
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub is_interacting: bool,
    pub pending_idle_timer: Option<IdleTimerHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    Unchanged,
    StartedInteracting,
    WentIdle,
}

#[derive(Debug, Resource)]
pub struct IdleDetector {
    grace: Duration,
    generation: u64,
    state: InteractionState,
}

impl IdleDetector {
    pub fn new(grace: Duration) -> Self {
        Self { grace, generation: 0, state: InteractionState::default() }
    }

    pub fn is_interacting(&self) -> bool {
        self.state.is_interacting
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn pending_timer(&self) -> Option<IdleTimerHandle> {
        self.state.pending_idle_timer
    }

    pub fn on_interaction_start(&mut self) -> IdleTransition {
        // Invalidate before touching anything else.
        self.generation = self.generation.wrapping_add(1);
        self.state.pending_idle_timer = None;
        if self.state.is_interacting {
            return IdleTransition::Unchanged;
        }
        self.state.is_interacting = true;
        tracing::debug!(target: "idle", "interaction started");
        IdleTransition::StartedInteracting
    }

    /// Mid-drag updates. They neither arm nor cancel the grace timer.
    pub fn on_interaction_change(&mut self) {
        tracing::trace!(target: "idle", interacting = self.state.is_interacting, "interaction change");
    }

    /// Arms (or re-arms) the grace timer. Returns the new handle, or `None`
    /// when there was no interaction to end.
    pub fn on_interaction_end(&mut self, now: Duration) -> Option<IdleTimerHandle> {
        if !self.state.is_interacting {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        let handle = IdleTimerHandle { generation: self.generation, deadline: now.saturating_add(self.grace) };
        self.state.pending_idle_timer = Some(handle);
        Some(handle)
    }

    /// Timer callback. Applies only if `handle` is still the armed timer.
    pub fn expire(&mut self, handle: IdleTimerHandle) -> IdleTransition {
        match self.state.pending_idle_timer {
            Some(pending) if pending == handle && handle.generation == self.generation => {
                self.state.pending_idle_timer = None;
                self.state.is_interacting = false;
                tracing::debug!(target: "idle", "grace period elapsed, resuming autonomous motion");
                IdleTransition::WentIdle
            }
            _ => IdleTransition::Unchanged,
        }
    }

    /// Fires the pending timer if its deadline has passed at `now`.
    pub fn poll(&mut self, now: Duration) -> IdleTransition {
        match self.state.pending_idle_timer {
            Some(handle) if now >= handle.deadline => self.expire(handle),
            _ => IdleTransition::Unchanged,
        }
    }

    /// Cancels any pending timer. Nothing fires after this.
    pub fn teardown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.state.pending_idle_timer = None;
    }
}

impl Default for IdleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_GRACE)
    }
}

impl Drop for IdleDetector {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Clock, ManualClock};

    #[test]
    fn goes_idle_exactly_at_grace_deadline() {
        let clock = ManualClock::new();
        let mut detector = IdleDetector::default();
        detector.on_interaction_start();
        detector.on_interaction_end(clock.now());

        clock.advance_millis(4999);
        assert_eq!(detector.poll(clock.now()), IdleTransition::Unchanged);
        assert!(detector.is_interacting());

        clock.advance_millis(1);
        assert_eq!(detector.poll(clock.now()), IdleTransition::WentIdle);
        assert!(!detector.is_interacting());
        assert!(detector.pending_timer().is_none());
    }

    #[test]
    fn stale_handle_never_applies() {
        let clock = ManualClock::new();
        let mut detector = IdleDetector::default();
        detector.on_interaction_start();
        let stale = detector.on_interaction_end(clock.now()).expect("timer armed");
        detector.on_interaction_start();
        clock.advance_millis(10_000);
        assert_eq!(detector.expire(stale), IdleTransition::Unchanged);
        assert!(detector.is_interacting());
    }

    #[test]
    fn re_ending_restarts_the_single_timer() {
        let clock = ManualClock::new();
        let mut detector = IdleDetector::default();
        detector.on_interaction_start();
        let first = detector.on_interaction_end(clock.now()).expect("armed");
        clock.advance_millis(3000);
        let second = detector.on_interaction_end(clock.now()).expect("re-armed");
        assert_ne!(first, second);
        assert_eq!(detector.pending_timer(), Some(second));

        clock.advance_millis(2500);
        assert_eq!(detector.poll(clock.now()), IdleTransition::Unchanged);
        assert_eq!(detector.expire(first), IdleTransition::Unchanged);
        clock.advance_millis(2500);
        assert_eq!(detector.poll(clock.now()), IdleTransition::WentIdle);
    }

    #[test]
    fn end_without_start_arms_nothing() {
        let mut detector = IdleDetector::default();
        assert!(detector.on_interaction_end(Duration::ZERO).is_none());
        assert_eq!(detector.state(), InteractionState::default());
    }

    #[test]
    fn teardown_cancels_pending_timer() {
        let clock = ManualClock::new();
        let mut detector = IdleDetector::default();
        detector.on_interaction_start();
        let handle = detector.on_interaction_end(clock.now()).expect("armed");
        detector.teardown();
        clock.advance_millis(6000);
        assert_eq!(detector.expire(handle), IdleTransition::Unchanged);
        assert_eq!(detector.poll(clock.now()), IdleTransition::Unchanged);
    }
}
