//! Hover/click affordances for interactive scene elements.
//!
//! Audio and cursor are best-effort side channels: a failing cue is logged and
//! reported on the event bus, but the element's action always runs.

use crate::animation::ElementId;
use crate::audio::AudioCues;
use crate::events::{Cue, DeckEvent, EventBus};
use std::collections::BTreeSet;

/// Host capability for the pointer affordance (e.g. a hand cursor).
pub trait HoverAffordance {
    fn set_hover_affordance(&mut self, active: bool);
}

/// Affordance sink for hosts without a cursor.
#[derive(Debug, Default)]
pub struct NoAffordance;

impl HoverAffordance for NoAffordance {
    fn set_hover_affordance(&mut self, active: bool) {
        tracing::trace!(target: "feedback", active, "hover affordance");
    }
}

/// A pointer event travelling from the nearest hit element to those behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub target: Option<ElementId>,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new(target: Option<ElementId>) -> Self {
        Self { target, propagation_stopped: false }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Default)]
pub struct InteractionFeedback {
    hovered: BTreeSet<ElementId>,
}

impl InteractionFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovered(&self, element: &ElementId) -> bool {
        self.hovered.contains(element)
    }

    pub fn affordance_active(&self) -> bool {
        !self.hovered.is_empty()
    }

    pub fn on_hover_enter(
        &mut self,
        element: &ElementId,
        audio: &mut dyn AudioCues,
        cursor: &mut dyn HoverAffordance,
        events: &mut EventBus,
    ) {
        if !self.hovered.insert(element.clone()) {
            return;
        }
        play_best_effort(audio, Cue::Hover, events);
        cursor.set_hover_affordance(true);
        events.push(DeckEvent::HoverChanged { element: element.clone(), hovered: true });
    }

    pub fn on_hover_exit(&mut self, element: &ElementId, cursor: &mut dyn HoverAffordance, events: &mut EventBus) {
        if !self.hovered.remove(element) {
            return;
        }
        if self.hovered.is_empty() {
            cursor.set_hover_affordance(false);
        }
        events.push(DeckEvent::HoverChanged { element: element.clone(), hovered: false });
    }

    /// Plays the click cue, stops `event` from reaching anything behind the
    /// element, then runs the element's own action.
    pub fn on_activate<R>(
        &mut self,
        event: &mut PointerEvent,
        audio: &mut dyn AudioCues,
        events: &mut EventBus,
        action: impl FnOnce() -> R,
    ) -> R {
        play_best_effort(audio, Cue::Click, events);
        event.stop_propagation();
        action()
    }

    /// Forgets elements that are no longer in the scene, reverting the cursor
    /// when nothing hovered remains.
    pub fn retain(&mut self, mut alive: impl FnMut(&ElementId) -> bool, cursor: &mut dyn HoverAffordance) {
        let had_hover = self.affordance_active();
        self.hovered.retain(|id| alive(id));
        if had_hover && !self.affordance_active() {
            cursor.set_hover_affordance(false);
        }
    }
}

pub(crate) fn play_best_effort(audio: &mut dyn AudioCues, cue: Cue, events: &mut EventBus) {
    match audio.play_cue(cue) {
        Ok(()) => events.push(DeckEvent::CuePlayed { cue }),
        Err(err) => {
            tracing::warn!(target: "audio", cue = cue.label(), "cue playback failed: {err:#}");
            events.push(DeckEvent::CueFailed { cue, error: err.to_string() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use anyhow::{bail, Result};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct BrokenSpeaker;

    impl AudioCues for BrokenSpeaker {
        fn play_cue(&mut self, _cue: Cue) -> Result<()> {
            bail!("autoplay blocked")
        }
    }

    #[derive(Default)]
    struct CursorLog(Vec<bool>);

    impl HoverAffordance for CursorLog {
        fn set_hover_affordance(&mut self, active: bool) {
            self.0.push(active);
        }
    }

    struct SharedLog(Rc<RefCell<Vec<&'static str>>>);

    impl AudioCues for SharedLog {
        fn play_cue(&mut self, cue: Cue) -> Result<()> {
            self.0.borrow_mut().push(cue.label());
            Ok(())
        }
    }

    #[test]
    fn activation_plays_click_before_action_and_stops_propagation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = SharedLog(log.clone());
        let mut feedback = InteractionFeedback::new();
        let mut events = EventBus::default();
        let mut event = PointerEvent::new(Some(ElementId::new("nav-button/1")));
        let result = feedback.on_activate(&mut event, &mut audio, &mut events, || {
            log.borrow_mut().push("action");
            42
        });
        assert_eq!(result, 42);
        assert!(event.is_propagation_stopped());
        assert_eq!(*log.borrow(), vec!["click", "action"]);
    }

    #[test]
    fn failing_audio_never_blocks_the_action() {
        let mut feedback = InteractionFeedback::new();
        let mut events = EventBus::default();
        let mut event = PointerEvent::new(None);
        let mut ran = false;
        feedback.on_activate(&mut event, &mut BrokenSpeaker, &mut events, || ran = true);
        assert!(ran);
        let drained = events.drain();
        assert!(matches!(drained.as_slice(), [DeckEvent::CueFailed { cue: Cue::Click, .. }]));
    }

    #[test]
    fn cursor_reverts_only_when_last_hover_exits() {
        let mut feedback = InteractionFeedback::new();
        let mut audio = AudioManager::new(8);
        let mut cursor = CursorLog::default();
        let mut events = EventBus::default();
        let a = ElementId::new("a");
        let b = ElementId::new("b");
        feedback.on_hover_enter(&a, &mut audio, &mut cursor, &mut events);
        feedback.on_hover_enter(&a, &mut audio, &mut cursor, &mut events);
        feedback.on_hover_enter(&b, &mut audio, &mut cursor, &mut events);
        feedback.on_hover_exit(&a, &mut cursor, &mut events);
        assert!(feedback.affordance_active());
        feedback.on_hover_exit(&b, &mut cursor, &mut events);
        assert!(!feedback.affordance_active());
        assert_eq!(cursor.0, vec![true, true, false]);
        assert_eq!(audio.recent_triggers().len(), 2, "re-entering a hovered element is silent");
    }
}
