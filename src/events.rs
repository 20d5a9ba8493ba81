use crate::animation::ElementId;
use crate::navigation::{NavigationState, SubSelection};
use bevy_ecs::prelude::Resource;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Hover,
    Click,
}

impl Cue {
    pub fn label(self) -> &'static str {
        match self {
            Cue::Hover => "hover",
            Cue::Click => "click",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
    CategorySelected { index: usize },
    SubSelectionChanged { category: usize, selection: SubSelection },
    NavigationRejected { reason: String },
    CuePlayed { cue: Cue },
    CueFailed { cue: Cue, error: String },
    HoverChanged { element: ElementId, hovered: bool },
    InteractionStarted,
    WentIdle,
    MusicToggled { muted: bool },
}

impl DeckEvent {
    pub fn from_transition(before: NavigationState, after: NavigationState) -> Option<Self> {
        if before.active_category != after.active_category {
            return Some(DeckEvent::CategorySelected { index: after.active_category });
        }
        if before.sub_selection != after.sub_selection {
            return Some(DeckEvent::SubSelectionChanged {
                category: after.active_category,
                selection: after.sub_selection,
            });
        }
        None
    }
}

impl fmt::Display for DeckEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckEvent::CategorySelected { index } => write!(f, "CategorySelected index={index}"),
            DeckEvent::SubSelectionChanged { category, selection } => {
                write!(f, "SubSelectionChanged category={category} selection={selection:?}")
            }
            DeckEvent::NavigationRejected { reason } => write!(f, "NavigationRejected {reason}"),
            DeckEvent::CuePlayed { cue } => write!(f, "CuePlayed cue={}", cue.label()),
            DeckEvent::CueFailed { cue, error } => write!(f, "CueFailed cue={} error={error}", cue.label()),
            DeckEvent::HoverChanged { element, hovered } => {
                write!(f, "HoverChanged element={element} hovered={hovered}")
            }
            DeckEvent::InteractionStarted => write!(f, "InteractionStarted"),
            DeckEvent::WentIdle => write!(f, "WentIdle"),
            DeckEvent::MusicToggled { muted } => write!(f, "MusicToggled muted={muted}"),
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<DeckEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: DeckEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<DeckEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
