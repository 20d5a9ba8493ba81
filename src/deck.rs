//! The presentation deck: composes navigation, idle detection, oscillation,
//! interpolation and interaction feedback into one frame-driven object.
//!
//! All state lives on the thread that owns the `Deck`. Hosts with their own
//! timer queues or threads marshal events onto that owner.

use crate::animation::{ElementId, VisualChannels};
use crate::audio::AudioCues;
use crate::camera3d::{Camera3D, ControlSignal, OrbitCamera, OrbitControls};
use crate::config::DeckConfig;
use crate::ecs::FrameWorld;
use crate::events::{Cue, DeckEvent, EventBus};
use crate::feedback::{play_best_effort, HoverAffordance, InteractionFeedback, PointerEvent};
use crate::idle::{IdleDetector, IdleTransition};
use crate::input::{Input, InputAction, InputEvent};
use crate::navigation::{NavigationState, NavigationStateMachine, Transition, ViewVariant};
use crate::oscillation::OscillatingRotation;
use crate::picking::pick_all;
use crate::report::ReportData;
use crate::scene::{
    compose, ControlAction, HoverStyle, NodeRole, RenderSink, SceneNode, SceneTree, HOVER_SCALE, PIVOT_ID,
};
use crate::time::Clock;
use glam::{Quat, Vec2, Vec3};
use winit::dpi::PhysicalSize;

/// External collaborators the deck calls into.
pub struct DeckCollaborators {
    pub audio: Box<dyn AudioCues>,
    pub cursor: Box<dyn HoverAffordance>,
    pub clock: Box<dyn Clock>,
}

/// Summary of one `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub writes: usize,
    pub rebuilt: bool,
    pub interacting: bool,
    pub pivot_angle: f32,
}

pub struct Deck {
    config: DeckConfig,
    report: ReportData,
    nav: NavigationStateMachine,
    idle: IdleDetector,
    frame: FrameWorld,
    feedback: InteractionFeedback,
    audio: Box<dyn AudioCues>,
    cursor: Box<dyn HoverAffordance>,
    clock: Box<dyn Clock>,
    controls: OrbitControls,
    input: Input,
    tree: SceneTree,
    tree_dirty: bool,
    pointer: Option<Vec2>,
    music_muted: bool,
}

impl Deck {
    pub fn new(config: DeckConfig, report: ReportData, collaborators: DeckCollaborators) -> Self {
        let nav = NavigationStateMachine::from_report(&report);
        let idle = IdleDetector::new(config.idle.grace());
        let pivot = ElementId::new(PIVOT_ID);
        let frame = FrameWorld::new(OscillatingRotation::new(config.oscillation), pivot, config.rates.easing);
        let camera = &config.camera;
        let controls =
            OrbitControls::new(OrbitCamera::looking_from(Vec3::from(camera.position), Vec3::from(camera.target)));
        let input = Input::from_bindings(&config.input.bindings);
        let tree = compose(&report, nav.state(), nav.view(), &config.rates);
        let music_muted = config.audio.start_muted;
        let mut audio = collaborators.audio;
        if let Err(err) = audio.set_music_muted(music_muted) {
            tracing::warn!(target: "audio", muted = music_muted, "initial music state failed: {err:#}");
        }
        let mut deck = Self {
            config,
            report,
            nav,
            idle,
            frame,
            feedback: InteractionFeedback::new(),
            audio,
            cursor: collaborators.cursor,
            clock: collaborators.clock,
            controls,
            input,
            tree,
            tree_dirty: true,
            pointer: None,
            music_muted,
        };
        deck.sync_registry();
        tracing::info!(
            target: "deck",
            title = %deck.report.title,
            categories = deck.report.len(),
            "presentation ready"
        );
        deck
    }

    pub fn state(&self) -> NavigationState {
        self.nav.state()
    }

    pub fn view(&self) -> ViewVariant {
        self.nav.view()
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn report(&self) -> &ReportData {
        &self.report
    }

    pub fn is_interacting(&self) -> bool {
        self.idle.is_interacting()
    }

    pub fn idle_detector(&self) -> &IdleDetector {
        &self.idle
    }

    pub fn oscillator(&self) -> &OscillatingRotation {
        self.frame.rotation()
    }

    pub fn channels(&self, id: &ElementId) -> Option<&VisualChannels> {
        self.frame.registry().get(id)
    }

    pub fn is_hovered(&self, id: &ElementId) -> bool {
        self.feedback.is_hovered(id)
    }

    pub fn music_muted(&self) -> bool {
        self.music_muted
    }

    pub fn camera(&self) -> Camera3D {
        let camera = &self.config.camera;
        self.controls.orbit().to_camera(camera.fov_y_degrees.to_radians(), camera.near, camera.far)
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        let [width, height] = self.config.camera.viewport;
        PhysicalSize::new(width, height)
    }

    pub fn drain_events(&mut self) -> Vec<DeckEvent> {
        self.frame.drain_events()
    }

    // ---------- navigation ----------

    /// Applies a navigation action without feedback cues.
    pub fn navigate(&mut self, action: ControlAction) -> Transition {
        let before = self.nav.state();
        let result = apply_action(&mut self.nav, action);
        self.after_transition(before, &result);
        result
    }

    pub fn select_category_signed(&mut self, index: i64) -> Transition {
        let before = self.nav.state();
        let result = self.nav.select_category_signed(index);
        self.after_transition(before, &result);
        result
    }

    /// Applies a navigation action the way a control activation does: click
    /// cue first, then the transition.
    pub fn activate(&mut self, action: ControlAction) -> Transition {
        let mut event = PointerEvent::new(None);
        self.activate_with(&mut event, action)
    }

    fn activate_with(&mut self, event: &mut PointerEvent, action: ControlAction) -> Transition {
        let before = self.nav.state();
        let mut events = std::mem::take(&mut *self.frame.events_mut());
        let nav = &mut self.nav;
        let result = self.feedback.on_activate(event, self.audio.as_mut(), &mut events, || apply_action(nav, action));
        self.restore_events(events);
        self.after_transition(before, &result);
        result
    }

    fn after_transition(&mut self, before: NavigationState, result: &Transition) {
        match result {
            Ok(after) => {
                if let Some(event) = DeckEvent::from_transition(before, *after) {
                    self.frame.events_mut().push(event);
                    self.recompose();
                }
            }
            Err(rejection) => {
                self.frame.events_mut().push(DeckEvent::NavigationRejected { reason: rejection.to_string() });
            }
        }
    }

    fn recompose(&mut self) {
        self.tree = compose(&self.report, self.nav.state(), self.nav.view(), &self.config.rates);
        self.tree_dirty = true;
        self.sync_registry();
    }

    /// Registers new nodes, retargets kept ones, forgets removed ones.
    fn sync_registry(&mut self) {
        let tree = &self.tree;
        let feedback = &self.feedback;
        {
            let mut registry = self.frame.registry_mut();
            registry.retain(|id| tree.contains(id));
            for node in &tree.nodes {
                let channels = registry.ensure(&node.id, &node.enter);
                channels.translation.set_target(node.rest.translation);
                channels.scale.set_target(node.rest.scale);
                channels.color.set_target(node.rest.color);
                if node.role != NodeRole::Pivot {
                    channels.rotation_y.set_target(node.rest.rotation_y);
                }
                if feedback.is_hovered(&node.id) {
                    apply_hover_target(channels, node, true);
                }
            }
        }
        self.feedback.retain(|id| tree.contains(id), self.cursor.as_mut());
    }

    // ---------- camera-control events ----------

    pub fn on_interaction_start(&mut self) {
        if self.idle.on_interaction_start() == IdleTransition::StartedInteracting {
            self.frame.events_mut().push(DeckEvent::InteractionStarted);
        }
    }

    pub fn on_interaction_change(&mut self) {
        self.idle.on_interaction_change();
    }

    pub fn on_interaction_end(&mut self) {
        let now = self.clock.now();
        self.idle.on_interaction_end(now);
    }

    fn forward_signal(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::Start => self.on_interaction_start(),
            ControlSignal::Change => self.on_interaction_change(),
            ControlSignal::End => self.on_interaction_end(),
        }
    }

    // ---------- pointer ----------

    /// Interactive nodes under `screen`, nearest first.
    pub fn hits_at(&self, screen: Vec2) -> Vec<ElementId> {
        let Some((origin, dir)) = self.camera().screen_ray(screen, self.viewport()) else {
            return Vec::new();
        };
        let pivot_angle =
            self.channels(&ElementId::new(PIVOT_ID)).map(|pivot| pivot.rotation_y.current()).unwrap_or(0.0);
        // Content under the pivot is tested in the pivot's frame.
        let to_pivot = Quat::from_rotation_y(-pivot_angle);
        let (pivot_origin, pivot_dir) = (to_pivot * origin, to_pivot * dir);
        let fixed = self.interactive_nodes(false).map(|node| (&node.id, node.hit_box()));
        let mut hits = pick_all(origin, dir, fixed);
        let content = self.interactive_nodes(true).map(|node| (&node.id, node.hit_box()));
        hits.extend(pick_all(pivot_origin, pivot_dir, content));
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(id, _)| id).collect()
    }

    fn interactive_nodes(&self, under_pivot: bool) -> impl Iterator<Item = &SceneNode> {
        self.tree.nodes.iter().filter(move |node| node.is_interactive() && node.under_pivot == under_pivot)
    }

    pub fn pointer_moved(&mut self, screen: Vec2) {
        let previous = self.pointer.replace(screen);
        if self.controls.is_dragging() {
            let delta = previous.map(|prev| screen - prev).unwrap_or(Vec2::ZERO);
            if let Some(signal) = self.controls.drag(delta) {
                self.forward_signal(signal);
            }
            return;
        }
        let hovered = self.hits_at(screen).into_iter().next();
        self.set_hovered(hovered);
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.set_hovered(None);
    }

    fn set_hovered(&mut self, hovered: Option<ElementId>) {
        let stale: Vec<ElementId> = self
            .tree
            .nodes
            .iter()
            .filter(|node| self.feedback.is_hovered(&node.id) && Some(&node.id) != hovered.as_ref())
            .map(|node| node.id.clone())
            .collect();
        let mut events = std::mem::take(&mut *self.frame.events_mut());
        for id in stale {
            self.feedback.on_hover_exit(&id, self.cursor.as_mut(), &mut events);
            self.retarget_hover(&id, false);
        }
        if let Some(id) = hovered {
            if !self.feedback.is_hovered(&id) {
                self.feedback.on_hover_enter(&id, self.audio.as_mut(), self.cursor.as_mut(), &mut events);
                self.retarget_hover(&id, true);
            }
        }
        self.restore_events(events);
    }

    fn retarget_hover(&mut self, id: &ElementId, hovered: bool) {
        let Some(node) = self.tree.node(id).cloned() else {
            return;
        };
        if let Some(channels) = self.frame.registry_mut().get_mut(id) {
            apply_hover_target(channels, &node, hovered);
        }
    }

    /// Routes a press to the nearest control; only an unclaimed press reaches
    /// the camera controls.
    pub fn pointer_pressed(&mut self) {
        let hits = self.pointer.map(|screen| self.hits_at(screen)).unwrap_or_default();
        let mut event = PointerEvent::new(hits.first().cloned());
        for id in hits {
            let Some(action) = self.tree.node(&id).and_then(|node| node.action) else {
                continue;
            };
            let _ = self.activate_with(&mut event, action);
            if event.is_propagation_stopped() {
                return;
            }
        }
        if let Some(signal) = self.controls.begin_drag() {
            self.forward_signal(signal);
        }
    }

    pub fn pointer_released(&mut self) {
        if let Some(signal) = self.controls.end_drag() {
            self.forward_signal(signal);
        }
    }

    pub fn wheel(&mut self, delta: f32) {
        for &signal in self.controls.wheel(delta) {
            self.forward_signal(signal);
        }
    }

    // ---------- audio ----------

    pub fn toggle_music(&mut self) -> bool {
        let muted = !self.music_muted;
        if let Err(err) = self.audio.set_music_muted(muted) {
            tracing::warn!(target: "audio", muted, "music toggle failed: {err:#}");
        }
        self.music_muted = muted;
        self.frame.events_mut().push(DeckEvent::MusicToggled { muted });
        muted
    }

    /// Plays the hover cue outside of any element, e.g. for host chrome.
    pub fn play_hover_cue(&mut self) {
        let mut events = std::mem::take(&mut *self.frame.events_mut());
        play_best_effort(self.audio.as_mut(), Cue::Hover, &mut events);
        self.restore_events(events);
    }

    // ---------- frame ----------

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    fn process_input(&mut self) {
        for action in self.input.take_actions() {
            let _ = match action {
                InputAction::SelectCategory(index) => self.activate(ControlAction::SelectCategory(index)),
                InputAction::NextSubItem => self.activate(ControlAction::Next),
                InputAction::PrevSubItem => self.activate(ControlAction::Prev),
                InputAction::Back => self.activate(ControlAction::Back),
                InputAction::ToggleMusic => {
                    self.toggle_music();
                    continue;
                }
            };
        }
        if self.input.take_press() {
            if let Some((x, y)) = self.input.cursor_position() {
                self.pointer = Some(Vec2::new(x, y));
            }
            self.pointer_pressed();
        }
        if let Some((dx, dy)) = self.input.take_drag_delta() {
            if let Some(signal) = self.controls.drag(Vec2::new(dx, dy)) {
                self.forward_signal(signal);
            }
        }
        if !self.controls.is_dragging() {
            if let Some((x, y)) = self.input.cursor_position() {
                let screen = Vec2::new(x, y);
                if self.pointer != Some(screen) {
                    self.pointer_moved(screen);
                }
            }
        } else if let Some((x, y)) = self.input.cursor_position() {
            self.pointer = Some(Vec2::new(x, y));
        }
        if self.input.take_release() {
            self.pointer_released();
        }
        if let Some(delta) = self.input.consume_wheel_delta() {
            self.wheel(delta);
        }
    }

    /// Advances one frame of `dt` seconds and pushes the results to `sink`.
    pub fn tick(&mut self, dt: f32, sink: &mut dyn RenderSink) -> FrameStats {
        self.process_input();
        if self.idle.poll(self.clock.now()) == IdleTransition::WentIdle {
            self.frame.events_mut().push(DeckEvent::WentIdle);
        }
        let rebuilt = std::mem::take(&mut self.tree_dirty);
        if rebuilt {
            sink.rebuild(&self.tree);
        }
        let interacting = self.idle.is_interacting();
        let writes = self.frame.update(dt, interacting);
        if !writes.is_empty() {
            sink.apply(&writes);
        }
        FrameStats { writes: writes.len(), rebuilt, interacting, pivot_angle: self.frame.rotation().angle() }
    }

    fn restore_events(&mut self, mut events: EventBus) {
        let mut bus = self.frame.events_mut();
        for event in bus.drain() {
            events.push(event);
        }
        *bus = events;
    }
}

fn apply_action(nav: &mut NavigationStateMachine, action: ControlAction) -> Transition {
    match action {
        ControlAction::SelectCategory(index) => nav.select_category(index),
        ControlAction::SelectSubItem(item) => nav.select_sub_item(item),
        ControlAction::Next => nav.next_sub_item(),
        ControlAction::Prev => nav.prev_sub_item(),
        ControlAction::Back => nav.back(),
    }
}

fn apply_hover_target(channels: &mut VisualChannels, node: &SceneNode, hovered: bool) {
    match node.hover {
        HoverStyle::None => {}
        HoverStyle::Grow => {
            let scale = if hovered { node.rest.scale * HOVER_SCALE } else { node.rest.scale };
            channels.scale.set_target(scale);
        }
        HoverStyle::Tint(color) => {
            channels.color.set_target(if hovered { color } else { node.rest.color });
        }
    }
}
