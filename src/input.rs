use serde::Deserialize;
use std::collections::HashMap;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Navigation request raised from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    SelectCategory(usize),
    NextSubItem,
    PrevSubItem,
    Back,
    ToggleMusic,
}

impl InputAction {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "next" | "next_sub_item" => Some(Self::NextSubItem),
            "prev" | "prev_sub_item" => Some(Self::PrevSubItem),
            "back" => Some(Self::Back),
            "toggle_music" => Some(Self::ToggleMusic),
            other => {
                let index = other.strip_prefix("select_category_")?.parse::<usize>().ok()?;
                index.checked_sub(1).map(Self::SelectCategory)
            }
        }
    }
}

/// Pointer and keyboard input, drained by the deck once per frame.
pub struct Input {
    bindings: InputBindings,
    actions: Vec<InputAction>,
    cursor_pos: Option<(f32, f32)>,
    left_pressed: bool,
    pending_press: bool,
    pending_release: bool,
    drag_delta: (f32, f32),
    wheel: f32,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(overrides: &HashMap<String, Vec<String>>) -> Self {
        Self::with_bindings(InputBindings::with_overrides(parse_overrides(overrides, "config")))
    }

    fn with_bindings(bindings: InputBindings) -> Self {
        Self {
            bindings,
            actions: Vec::new(),
            cursor_pos: None,
            left_pressed: false,
            pending_press: false,
            pending_release: false,
            drag_delta: (0.0, 0.0),
            wheel: 0.0,
        }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                if pressed {
                    if let Some(binding) = InputKeyBinding::from_event_key(&key) {
                        self.actions.extend(self.bindings.actions_for_key(&binding));
                    }
                }
            }
            InputEvent::CursorPos { x, y } => {
                if self.left_pressed {
                    if let Some((px, py)) = self.cursor_pos {
                        self.drag_delta.0 += x - px;
                        self.drag_delta.1 += y - py;
                    }
                }
                self.cursor_pos = Some((x, y));
            }
            InputEvent::MouseButton { button: MouseButton::Left, pressed } => {
                if pressed && !self.left_pressed {
                    self.pending_press = true;
                } else if !pressed && self.left_pressed {
                    self.pending_release = true;
                }
                self.left_pressed = pressed;
            }
            InputEvent::Wheel { delta } => self.wheel += delta,
            InputEvent::MouseButton { .. } | InputEvent::Other => {}
        }
    }

    pub fn take_actions(&mut self) -> Vec<InputAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn take_press(&mut self) -> bool {
        std::mem::take(&mut self.pending_press)
    }

    pub fn take_release(&mut self) -> bool {
        std::mem::take(&mut self.pending_release)
    }

    pub fn take_drag_delta(&mut self) -> Option<(f32, f32)> {
        let delta = std::mem::take(&mut self.drag_delta);
        (delta != (0.0, 0.0)).then_some(delta)
    }

    pub fn consume_wheel_delta(&mut self) -> Option<f32> {
        if self.wheel.abs() > 0.0 {
            Some(std::mem::take(&mut self.wheel))
        } else {
            None
        }
    }

    pub fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor_pos
    }

    pub fn left_held(&self) -> bool {
        self.left_pressed
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::with_bindings(InputBindings::default())
    }
}

#[derive(Debug, Clone)]
struct InputBindings {
    key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>>,
}

impl InputBindings {
    fn with_overrides(overrides: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut action_map = Self::default_action_map();
        for (action, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            action_map.insert(action, keys);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<InputAction, Vec<InputKeyBinding>> {
        use InputAction::*;
        let mut map = HashMap::new();
        for index in 0..9 {
            map.insert(SelectCategory(index), vec![InputKeyBinding::character(&(index + 1).to_string())]);
        }
        map.insert(NextSubItem, vec![InputKeyBinding::named(NamedKeyCode::ArrowRight)]);
        map.insert(PrevSubItem, vec![InputKeyBinding::named(NamedKeyCode::ArrowLeft)]);
        map.insert(
            Back,
            vec![InputKeyBinding::named(NamedKeyCode::Escape), InputKeyBinding::named(NamedKeyCode::Backspace)],
        );
        map.insert(ToggleMusic, vec![InputKeyBinding::character("m")]);
        map
    }

    fn from_action_map(action_map: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut key_to_actions: HashMap<InputKeyBinding, Vec<InputAction>> = HashMap::new();
        for (action, keys) in action_map {
            for key in keys {
                key_to_actions.entry(key).or_default().push(action);
            }
        }
        Self { key_to_actions }
    }

    fn actions_for_key(&self, key: &InputKeyBinding) -> impl Iterator<Item = InputAction> + '_ {
        self.key_to_actions.get(key).into_iter().flatten().copied()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InputKeyBinding {
    Character(String),
    Named(NamedKeyCode),
}

impl InputKeyBinding {
    fn character(ch: &str) -> Self {
        Self::Character(ch.to_lowercase())
    }

    fn named(named: NamedKeyCode) -> Self {
        Self::Named(named)
    }

    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) if !ch.is_empty() => Some(Self::Character(ch.to_lowercase())),
            Key::Named(named) => NamedKeyCode::from_named_key(named).map(Self::Named),
            _ => None,
        }
    }

    fn from_config_value(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if let Some(named) = NamedKeyCode::from_str(&normalized) {
            return Some(Self::Named(named));
        }
        (normalized.chars().count() == 1).then_some(Self::Character(normalized))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NamedKeyCode {
    ArrowLeft,
    ArrowRight,
    Escape,
    Backspace,
    Space,
}

impl NamedKeyCode {
    fn from_named_key(key: &NamedKey) -> Option<Self> {
        match key {
            NamedKey::ArrowLeft => Some(Self::ArrowLeft),
            NamedKey::ArrowRight => Some(Self::ArrowRight),
            NamedKey::Escape => Some(Self::Escape),
            NamedKey::Backspace => Some(Self::Backspace),
            NamedKey::Space => Some(Self::Space),
            _ => None,
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "left" | "arrow_left" => Some(Self::ArrowLeft),
            "right" | "arrow_right" => Some(Self::ArrowRight),
            "escape" | "esc" => Some(Self::Escape),
            "backspace" => Some(Self::Backspace),
            "space" => Some(Self::Space),
            _ => None,
        }
    }
}

/// Input section of the deck config: action name to key names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub bindings: HashMap<String, Vec<String>>,
}

fn parse_overrides(bindings: &HashMap<String, Vec<String>>, origin: &str) -> HashMap<InputAction, Vec<InputKeyBinding>> {
    let mut overrides = HashMap::new();
    for (action_name, keys) in bindings {
        let Some(action) = InputAction::from_str(&action_name.trim().to_lowercase()) else {
            tracing::warn!(target: "input", origin, action = %action_name, "unknown action, ignoring");
            continue;
        };
        let mut parsed = Vec::new();
        for key in keys {
            match InputKeyBinding::from_config_value(key) {
                Some(binding) => parsed.push(binding),
                None => {
                    tracing::warn!(target: "input", origin, action = %action_name, key = %key, "unknown key, ignoring")
                }
            }
        }
        if parsed.is_empty() {
            tracing::warn!(target: "input", origin, action = %action_name, "no valid keys, keeping defaults");
            continue;
        }
        overrides.insert(action, parsed);
    }
    overrides
}

pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Wheel { delta: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    CursorPos { x: f32, y: f32 },
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                InputEvent::Wheel { delta: d }
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorPos { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                InputEvent::MouseButton { button: *button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }
}
