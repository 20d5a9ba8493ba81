//! Composition of the render tree for the active view.
//!
//! `compose` is a pure function of the report, the navigation state and the
//! rates in effect. The deck feeds its output into the animation registry and
//! hands it to the renderer.

use crate::animation::{ElementId, PropertyWrite, VisualSpec};
use crate::config::RateConfig;
use crate::navigation::{MonthSlot, NavigationState, SubItem, ViewVariant};
use crate::picking::HitBox;
use crate::report::{parse_hex_color, Category, ReportData};
use glam::{Vec3, Vec4};

pub const PIVOT_ID: &str = "scene/pivot";
pub const MAX_BAR_HEIGHT: f32 = 5.0;
pub const HOVER_SCALE: f32 = 1.1;

const BAR_SPACING: f32 = 1.2;
const BAR_WIDTH: f32 = 0.8;
const BAR_BASE_Y: f32 = -2.5;
const NAV_Y: f32 = -4.5;
const NAV_SPACING: f32 = 2.6;
const NAV_SIZE: Vec3 = Vec3::new(2.4, 0.6, 0.2);
const CARD_SIZE: Vec3 = Vec3::new(2.6, 1.6, 0.1);
const CARD_COLUMNS: usize = 3;
const PANEL_SIZE: Vec3 = Vec3::new(5.0, 4.0, 0.1);
const CONTROL_SIZE: Vec3 = Vec3::new(0.8, 0.8, 0.2);

const WHITE: Vec4 = Vec4::ONE;
const DIM: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.2);
const HIGHLIGHT: Vec4 = Vec4::new(1.0, 0.84, 0.3, 1.0);
const BAR_PALETTE: [Vec4; 4] = [
    Vec4::new(0.29, 0.56, 0.89, 1.0),
    Vec4::new(0.31, 0.78, 0.47, 1.0),
    Vec4::new(0.95, 0.61, 0.07, 1.0),
    Vec4::new(0.61, 0.35, 0.71, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    SelectCategory(usize),
    SelectSubItem(SubItem),
    Next,
    Prev,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Pivot,
    Title,
    NavButton { index: usize, active: bool },
    Bar { index: usize },
    PersonaCard { index: usize },
    PersonaPanel { index: usize },
    MonthPanel { slot: MonthSlot },
    Control,
    Panel,
    Notice,
}

/// How a node reacts to the pointer resting on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverStyle {
    None,
    Grow,
    Tint(Vec4),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: ElementId,
    pub role: NodeRole,
    pub label: String,
    pub lines: Vec<String>,
    /// Content nodes hang under the rotating pivot; chrome stays put.
    pub under_pivot: bool,
    pub action: Option<ControlAction>,
    pub hover: HoverStyle,
    /// Pose the node animates in from when it first appears.
    pub enter: VisualSpec,
    /// Pose the node settles at.
    pub rest: VisualSpec,
    pub hit_size: Vec3,
}

impl SceneNode {
    fn new(id: impl AsRef<str>, role: NodeRole, rest: VisualSpec) -> Self {
        Self {
            id: ElementId::new(id),
            role,
            label: String::new(),
            lines: Vec::new(),
            under_pivot: true,
            action: None,
            hover: HoverStyle::None,
            enter: rest,
            rest,
            hit_size: rest.scale,
        }
    }

    fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }

    fn fixed(mut self) -> Self {
        self.under_pivot = false;
        self
    }

    fn action(mut self, action: ControlAction) -> Self {
        self.action = Some(action);
        self.hover = HoverStyle::Grow;
        self
    }

    fn entering_from(mut self, enter: VisualSpec) -> Self {
        self.enter = enter;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.action.is_some() || self.hover != HoverStyle::None
    }

    pub fn hit_box(&self) -> HitBox {
        HitBox::from_center_size(self.rest.translation, self.hit_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneTree {
    pub title: String,
    pub view: ViewVariant,
    pub nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn node(&self, id: &ElementId) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.node(id).is_some()
    }

    pub fn nodes_with_role(&self, matches: impl Fn(&NodeRole) -> bool) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |node| matches(&node.role))
    }
}

/// Render collaborator: receives the tree when the view changes and the
/// property writes of every frame.
pub trait RenderSink {
    fn rebuild(&mut self, tree: &SceneTree);
    fn apply(&mut self, writes: &[PropertyWrite]);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn rebuild(&mut self, _tree: &SceneTree) {}
    fn apply(&mut self, _writes: &[PropertyWrite]) {}
}

pub fn compose(report: &ReportData, state: NavigationState, view: ViewVariant, rates: &RateConfig) -> SceneTree {
    let mut nodes = vec![pivot_node(rates)];
    nodes.push(
        SceneNode::new("chrome/title", NodeRole::Title, VisualSpec { translation: Vec3::new(0.0, 4.5, 0.0), ..base(rates) })
            .label(report.title.clone())
            .fixed(),
    );
    nodes.extend(nav_buttons(report, state.active_category, rates));

    let category = report.category(state.active_category);
    match (view, category) {
        (ViewVariant::MetricBars, Some(category)) => nodes.extend(metric_bars(category, rates)),
        (ViewVariant::PersonaGrid, Some(category)) => nodes.extend(persona_grid(category, rates)),
        (ViewVariant::PersonaDetail(index), Some(category)) => nodes.extend(persona_detail(category, index, rates)),
        (ViewVariant::MonthOverview, Some(category)) => nodes.extend(month_overview(category, rates)),
        (ViewVariant::MonthDetail(slot), Some(category)) => nodes.extend(month_detail(category, slot, rates)),
        (ViewVariant::Generic, Some(category)) => nodes.push(generic_panel(category, rates)),
        _ => nodes.push(
            SceneNode::new("content/notice", NodeRole::Notice, base(rates)).label("No report data loaded"),
        ),
    }
    SceneTree { title: report.title.clone(), view, nodes }
}

fn base(rates: &RateConfig) -> VisualSpec {
    VisualSpec {
        translation_rate: rates.bar_height,
        rotation_rate: rates.rotation,
        scale_rate: rates.button_scale,
        color_rate: rates.hover_color,
        ..VisualSpec::default()
    }
}

fn pivot_node(rates: &RateConfig) -> SceneNode {
    SceneNode::new(PIVOT_ID, NodeRole::Pivot, base(rates)).fixed()
}

fn row_x(index: usize, count: usize, spacing: f32) -> f32 {
    (index as f32 - (count.saturating_sub(1)) as f32 * 0.5) * spacing
}

fn nav_buttons(report: &ReportData, active: usize, rates: &RateConfig) -> Vec<SceneNode> {
    let count = report.categories.len();
    report
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let is_active = index == active;
            let rest = VisualSpec {
                translation: Vec3::new(row_x(index, count, NAV_SPACING), NAV_Y, 0.0),
                scale: NAV_SIZE,
                color: if is_active { WHITE } else { DIM },
                ..base(rates)
            };
            SceneNode::new(format!("nav-button/{index}"), NodeRole::NavButton { index, active: is_active }, rest)
                .label(category.name.clone())
                .fixed()
                .action(ControlAction::SelectCategory(index))
        })
        .collect()
}

/// Each bar is scaled against its own declared max, or the tallest value when
/// that is larger or missing.
pub fn bar_heights(category: &Category) -> Vec<f32> {
    let stats = category.stats();
    let largest = stats.iter().map(|stat| stat.value).filter(|v| v.is_finite()).fold(0.0_f32, f32::max);
    stats
        .iter()
        .map(|stat| {
            let ceiling = stat.max.filter(|max| max.is_finite()).unwrap_or(0.0).max(largest);
            if ceiling <= 0.0 || !stat.value.is_finite() {
                0.0
            } else {
                (stat.value.max(0.0) / ceiling) * MAX_BAR_HEIGHT
            }
        })
        .collect()
}

fn metric_bars(category: &Category, rates: &RateConfig) -> Vec<SceneNode> {
    let heights = bar_heights(category);
    let count = heights.len();
    category
        .stats()
        .iter()
        .zip(heights)
        .enumerate()
        .map(|(index, (stat, height))| {
            let x = row_x(index, count, BAR_SPACING);
            let color = stat
                .color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(BAR_PALETTE[index % BAR_PALETTE.len()]);
            let rest = VisualSpec {
                translation: Vec3::new(x, BAR_BASE_Y + height * 0.5, 0.0),
                scale: Vec3::new(BAR_WIDTH, height, BAR_WIDTH),
                color,
                ..base(rates)
            };
            let enter = VisualSpec {
                translation: Vec3::new(x, BAR_BASE_Y, 0.0),
                scale: Vec3::new(BAR_WIDTH, 0.0, BAR_WIDTH),
                ..rest
            };
            let mut node = SceneNode::new(format!("bar/{}/{index}", category.id), NodeRole::Bar { index }, rest)
                .label(format!("{}: {}", stat.label, stat.value))
                .entering_from(enter);
            node.hover = HoverStyle::Tint(HIGHLIGHT);
            node.hit_size = Vec3::new(BAR_WIDTH, height.max(0.2), BAR_WIDTH);
            node
        })
        .collect()
}

fn persona_grid(category: &Category, rates: &RateConfig) -> Vec<SceneNode> {
    let personas = category.personas();
    let rows = personas.len().div_ceil(CARD_COLUMNS);
    personas
        .iter()
        .enumerate()
        .map(|(index, persona)| {
            let row = index / CARD_COLUMNS;
            let in_row = (personas.len() - row * CARD_COLUMNS).min(CARD_COLUMNS);
            let x = row_x(index % CARD_COLUMNS, in_row, CARD_SIZE.x + 0.3);
            let y = (rows.saturating_sub(1) as f32 * 0.5 - row as f32) * (CARD_SIZE.y + 0.3);
            let rest = VisualSpec { translation: Vec3::new(x, y, 0.0), scale: CARD_SIZE, ..base(rates) };
            SceneNode::new(format!("persona-card/{index}"), NodeRole::PersonaCard { index }, rest)
                .label(persona.name.clone())
                .lines(vec![persona.role.clone()])
                .entering_from(VisualSpec { scale: Vec3::ZERO, ..rest })
                .action(ControlAction::SelectSubItem(SubItem::Persona(index)))
        })
        .collect()
}

fn detail_controls(rates: &RateConfig, stepping: bool) -> Vec<SceneNode> {
    let control = |id: &str, label: &str, x: f32, y: f32, action: ControlAction| {
        let rest = VisualSpec { translation: Vec3::new(x, y, 0.2), scale: CONTROL_SIZE, ..base(rates) };
        SceneNode::new(id, NodeRole::Control, rest).label(label).action(action)
    };
    let mut nodes = vec![control("control/back", "Back", -PANEL_SIZE.x * 0.5, PANEL_SIZE.y * 0.5 + 0.6, ControlAction::Back)];
    if stepping {
        nodes.push(control("control/prev", "<", -PANEL_SIZE.x * 0.5 - 0.8, 0.0, ControlAction::Prev));
        nodes.push(control("control/next", ">", PANEL_SIZE.x * 0.5 + 0.8, 0.0, ControlAction::Next));
    }
    nodes
}

fn panel(id: String, role: NodeRole, rates: &RateConfig) -> SceneNode {
    let rest = VisualSpec { scale: PANEL_SIZE, ..base(rates) };
    SceneNode::new(id, role, rest).entering_from(VisualSpec { scale: Vec3::ZERO, ..rest })
}

fn persona_detail(category: &Category, index: usize, rates: &RateConfig) -> Vec<SceneNode> {
    let personas = category.personas();
    let mut nodes = Vec::new();
    match personas.get(index) {
        Some(persona) => {
            let mut lines = vec![persona.role.clone(), persona.summary.clone()];
            lines.extend(persona.highlights.iter().cloned());
            lines.retain(|line| !line.is_empty());
            nodes.push(
                panel(format!("persona-panel/{index}"), NodeRole::PersonaPanel { index }, rates)
                    .label(persona.name.clone())
                    .lines(lines),
            );
        }
        None => nodes.push(SceneNode::new("content/notice", NodeRole::Notice, base(rates)).label("Persona unavailable")),
    }
    nodes.extend(detail_controls(rates, personas.len() > 1));
    nodes
}

fn month_title(category: &Category, slot: MonthSlot) -> String {
    category
        .months()
        .get(slot.index())
        .map(|month| month.label.clone())
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| format!("Month {}", slot.index() + 1))
}

fn month_overview(category: &Category, rates: &RateConfig) -> Vec<SceneNode> {
    MonthSlot::ALL
        .iter()
        .map(|&slot| {
            let x = row_x(slot.index(), MonthSlot::ALL.len(), PANEL_SIZE.x * 0.6);
            let rest = VisualSpec {
                translation: Vec3::new(x, 0.0, 0.0),
                scale: Vec3::new(PANEL_SIZE.x * 0.5, PANEL_SIZE.y, PANEL_SIZE.z),
                ..base(rates)
            };
            let objectives =
                category.months().get(slot.index()).map(|month| month.objectives.clone()).unwrap_or_default();
            let node = SceneNode::new(format!("month-panel/{}", slot.label()), NodeRole::MonthPanel { slot }, rest)
                .label(month_title(category, slot))
                .lines(objectives)
                .entering_from(VisualSpec { scale: Vec3::ZERO, ..rest });
            if slot.index() < category.months().len() {
                node.action(ControlAction::SelectSubItem(SubItem::Month(slot)))
            } else {
                node
            }
        })
        .collect()
}

fn month_detail(category: &Category, slot: MonthSlot, rates: &RateConfig) -> Vec<SceneNode> {
    let objectives = category.months().get(slot.index()).map(|month| month.objectives.clone()).unwrap_or_default();
    let mut nodes = vec![panel(format!("month-detail/{}", slot.label()), NodeRole::MonthPanel { slot }, rates)
        .label(month_title(category, slot))
        .lines(objectives)];
    nodes.extend(detail_controls(rates, category.months().len() >= MonthSlot::ALL.len()));
    nodes
}

fn generic_panel(category: &Category, rates: &RateConfig) -> SceneNode {
    let (headline, lines) = match &category.content {
        crate::report::CategoryContent::Generic(panel) => (panel.headline.clone(), panel.lines.clone()),
        _ => (None, Vec::new()),
    };
    panel(format!("panel/{}", category.id), NodeRole::Panel, rates)
        .label(headline.unwrap_or_else(|| category.name.clone()))
        .lines(lines)
}
