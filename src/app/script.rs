use crate::deck::Deck;
use crate::navigation::{MonthSlot, SubItem};
use crate::scene::ControlAction;
use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Timed host events replayed against a deck.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Seconds since the start of the run.
    pub at: f32,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    SelectCategory { index: i64 },
    SelectPersona { index: usize },
    SelectMonth { month: usize },
    Next,
    Prev,
    Back,
    OrbitStart,
    OrbitEnd,
    PointerMove { x: f32, y: f32 },
    PointerDown,
    PointerUp,
    Wheel { delta: f32 },
    ToggleMusic,
}

impl Script {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Failed to read script {}", path.display()))?;
        let mut script: Script =
            serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse script {}", path.display()))?;
        script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }
}

pub(crate) struct ScriptPlayer {
    steps: Vec<ScriptStep>,
    next: usize,
}

impl ScriptPlayer {
    pub(crate) fn new(mut script: Script) -> Self {
        script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { steps: script.steps, next: 0 }
    }

    /// Steps whose time has come, in order. Each step is returned once.
    pub(crate) fn due(&mut self, elapsed: f32) -> Vec<ScriptAction> {
        let start = self.next;
        while self.next < self.steps.len() && self.steps[self.next].at <= elapsed {
            self.next += 1;
        }
        self.steps[start..self.next].iter().map(|step| step.action.clone()).collect()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.steps.len() - self.next
    }
}

pub(crate) fn apply(deck: &mut Deck, action: &ScriptAction) {
    // Rejections are logged by the navigation layer.
    let _ = match *action {
        ScriptAction::SelectCategory { index } => match usize::try_from(index) {
            Ok(index) => deck.activate(ControlAction::SelectCategory(index)),
            Err(_) => deck.select_category_signed(index),
        },
        ScriptAction::SelectPersona { index } => deck.activate(ControlAction::SelectSubItem(SubItem::Persona(index))),
        ScriptAction::SelectMonth { month } => match MonthSlot::from_index(month) {
            Some(slot) => deck.activate(ControlAction::SelectSubItem(SubItem::Month(slot))),
            None => {
                tracing::warn!(target: "script", month, "month index must be 0 or 1, ignoring");
                return;
            }
        },
        ScriptAction::Next => deck.activate(ControlAction::Next),
        ScriptAction::Prev => deck.activate(ControlAction::Prev),
        ScriptAction::Back => deck.activate(ControlAction::Back),
        ScriptAction::OrbitStart => {
            deck.on_interaction_start();
            return;
        }
        ScriptAction::OrbitEnd => {
            deck.on_interaction_end();
            return;
        }
        ScriptAction::PointerMove { x, y } => {
            deck.pointer_moved(Vec2::new(x, y));
            return;
        }
        ScriptAction::PointerDown => {
            deck.pointer_pressed();
            return;
        }
        ScriptAction::PointerUp => {
            deck.pointer_released();
            return;
        }
        ScriptAction::Wheel { delta } => {
            deck.wheel(delta);
            return;
        }
        ScriptAction::ToggleMusic => {
            deck.toggle_music();
            return;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_steps_and_plays_each_once() {
        let script: Script = serde_json::from_str(
            r#"{"steps": [
                {"at": 2.0, "action": "back"},
                {"at": 0.5, "action": "select_category", "index": 1},
                {"at": 1.0, "action": "pointer_move", "x": 10, "y": 20}
            ]}"#,
        )
        .expect("script parses");
        let mut player = ScriptPlayer::new(script);
        assert_eq!(player.due(0.4), Vec::new());
        assert_eq!(player.due(1.0), vec![
            ScriptAction::SelectCategory { index: 1 },
            ScriptAction::PointerMove { x: 10.0, y: 20.0 },
        ]);
        assert_eq!(player.remaining(), 1);
        assert_eq!(player.due(5.0), vec![ScriptAction::Back]);
        assert!(player.due(10.0).is_empty());
    }
}
