//! Category / sub-selection state machine and the view it implies.

use crate::report::{CategoryKind, ReportData};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthSlot {
    First,
    Second,
}

impl MonthSlot {
    pub const ALL: [MonthSlot; 2] = [MonthSlot::First, MonthSlot::Second];

    pub fn index(self) -> usize {
        match self {
            MonthSlot::First => 0,
            MonthSlot::Second => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MonthSlot::First),
            1 => Some(MonthSlot::Second),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MonthSlot::First => MonthSlot::Second,
            MonthSlot::Second => MonthSlot::First,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MonthSlot::First => "first",
            MonthSlot::Second => "second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubSelection {
    #[default]
    None,
    PersonaIndex(usize),
    Month(MonthSlot),
}

impl SubSelection {
    pub fn is_none(&self) -> bool {
        matches!(self, SubSelection::None)
    }
}

/// A nested pick within the active category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubItem {
    Persona(usize),
    Month(MonthSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NavigationState {
    pub active_category: usize,
    pub sub_selection: SubSelection,
}

/// What the navigation machine needs to know about one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryShape {
    pub kind: CategoryKind,
    pub persona_count: usize,
    pub month_count: usize,
}

impl CategoryShape {
    pub fn new(kind: CategoryKind) -> Self {
        Self { kind, persona_count: 0, month_count: 0 }
    }

    pub fn personas(count: usize) -> Self {
        Self { kind: CategoryKind::OverviewPersonas, persona_count: count, month_count: 0 }
    }

    pub fn months(count: usize) -> Self {
        Self { kind: CategoryKind::NextStepsMonths, persona_count: 0, month_count: count.min(MonthSlot::ALL.len()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationRejection {
    #[error("category index {index} out of range (count {count})")]
    CategoryOutOfRange { index: i64, count: usize },
    #[error("category '{kind}' has no nested items")]
    NoNestedItems { kind: &'static str },
    #[error("sub-item {index} out of range (count {count})")]
    SubItemOutOfRange { index: usize, count: usize },
    #[error("sub-item kind does not match category '{kind}'")]
    KindMismatch { kind: &'static str },
    #[error("no sub-item selected")]
    NothingSelected,
}

/// View variant rendered for a `(kind, sub_selection)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewVariant {
    MetricBars,
    PersonaGrid,
    PersonaDetail(usize),
    MonthOverview,
    MonthDetail(MonthSlot),
    Generic,
    /// The report has no categories at all.
    Empty,
}

pub fn derive_view(kind: CategoryKind, sub_selection: SubSelection) -> ViewVariant {
    match (kind, sub_selection) {
        (CategoryKind::MetricBars, _) => ViewVariant::MetricBars,
        (CategoryKind::OverviewPersonas, SubSelection::PersonaIndex(index)) => ViewVariant::PersonaDetail(index),
        (CategoryKind::OverviewPersonas, _) => ViewVariant::PersonaGrid,
        (CategoryKind::NextStepsMonths, SubSelection::Month(slot)) => ViewVariant::MonthDetail(slot),
        (CategoryKind::NextStepsMonths, _) => ViewVariant::MonthOverview,
        (CategoryKind::Generic, _) => ViewVariant::Generic,
    }
}

pub type Transition = Result<NavigationState, NavigationRejection>;

#[derive(Debug, Clone)]
pub struct NavigationStateMachine {
    shapes: Vec<CategoryShape>,
    state: NavigationState,
}

impl NavigationStateMachine {
    pub fn new(shapes: Vec<CategoryShape>) -> Self {
        Self { shapes, state: NavigationState::default() }
    }

    pub fn from_report(report: &ReportData) -> Self {
        let shapes = report
            .categories
            .iter()
            .map(|category| CategoryShape {
                kind: category.kind,
                persona_count: category.personas().len(),
                month_count: category.months().len().min(MonthSlot::ALL.len()),
            })
            .collect();
        Self::new(shapes)
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn category_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn active_shape(&self) -> Option<&CategoryShape> {
        self.shapes.get(self.state.active_category)
    }

    pub fn view(&self) -> ViewVariant {
        match self.active_shape() {
            Some(shape) => derive_view(shape.kind, self.state.sub_selection),
            None => ViewVariant::Empty,
        }
    }

    pub fn select_category(&mut self, index: usize) -> Transition {
        if index >= self.shapes.len() {
            let count = self.shapes.len();
            return self.reject(NavigationRejection::CategoryOutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                count,
            });
        }
        self.state = NavigationState { active_category: index, sub_selection: SubSelection::None };
        Ok(self.state)
    }

    /// Entry point for hosts that may hand over negative indices.
    pub fn select_category_signed(&mut self, index: i64) -> Transition {
        match usize::try_from(index) {
            Ok(index) => self.select_category(index),
            Err(_) => {
                let count = self.shapes.len();
                self.reject(NavigationRejection::CategoryOutOfRange { index, count })
            }
        }
    }

    pub fn select_sub_item(&mut self, item: SubItem) -> Transition {
        let Some(shape) = self.active_shape().copied() else {
            return self.reject(NavigationRejection::NoNestedItems { kind: "none" });
        };
        let selection = match (shape.kind, item) {
            (CategoryKind::OverviewPersonas, SubItem::Persona(index)) => {
                Self::check_range(index, shape.persona_count).map(|_| SubSelection::PersonaIndex(index))
            }
            (CategoryKind::NextStepsMonths, SubItem::Month(slot)) => {
                Self::check_range(slot.index(), shape.month_count).map(|_| SubSelection::Month(slot))
            }
            (CategoryKind::OverviewPersonas, _) | (CategoryKind::NextStepsMonths, _) => {
                Err(NavigationRejection::KindMismatch { kind: shape.kind.label() })
            }
            (kind, _) => Err(NavigationRejection::NoNestedItems { kind: kind.label() }),
        };
        match selection {
            Ok(sub_selection) => {
                self.state.sub_selection = sub_selection;
                Ok(self.state)
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    pub fn next_sub_item(&mut self) -> Transition {
        self.step_sub_item(true)
    }

    pub fn prev_sub_item(&mut self) -> Transition {
        self.step_sub_item(false)
    }

    /// Clears the sub-selection. Already at `None` is a no-op, not an error.
    pub fn back(&mut self) -> Transition {
        self.state.sub_selection = SubSelection::None;
        Ok(self.state)
    }

    fn step_sub_item(&mut self, forward: bool) -> Transition {
        let shape = self.active_shape().copied();
        let next = match (self.state.sub_selection, shape) {
            (SubSelection::None, _) | (_, None) => Err(NavigationRejection::NothingSelected),
            (SubSelection::PersonaIndex(index), Some(shape)) => {
                let len = shape.persona_count;
                if len == 0 {
                    Err(NavigationRejection::SubItemOutOfRange { index, count: 0 })
                } else if forward {
                    Ok(SubSelection::PersonaIndex((index + 1) % len))
                } else {
                    Ok(SubSelection::PersonaIndex((index + len - 1) % len))
                }
            }
            (SubSelection::Month(slot), Some(shape)) => {
                // With a single month there is nothing to toggle to.
                if shape.month_count >= MonthSlot::ALL.len() {
                    Ok(SubSelection::Month(slot.toggled()))
                } else {
                    Ok(SubSelection::Month(slot))
                }
            }
        };
        match next {
            Ok(sub_selection) => {
                self.state.sub_selection = sub_selection;
                Ok(self.state)
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    fn check_range(index: usize, count: usize) -> Result<(), NavigationRejection> {
        if index >= count {
            return Err(NavigationRejection::SubItemOutOfRange { index, count });
        }
        Ok(())
    }

    fn reject(&self, rejection: NavigationRejection) -> Transition {
        tracing::warn!(
            target: "navigation",
            category = self.state.active_category,
            "rejected navigation request: {rejection}"
        );
        Err(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> NavigationStateMachine {
        NavigationStateMachine::new(vec![
            CategoryShape::new(CategoryKind::MetricBars),
            CategoryShape::personas(3),
            CategoryShape::months(2),
            CategoryShape::new(CategoryKind::Generic),
        ])
    }

    #[test]
    fn starts_on_first_category_without_selection() {
        let nav = machine();
        assert_eq!(nav.state(), NavigationState { active_category: 0, sub_selection: SubSelection::None });
        assert_eq!(nav.view(), ViewVariant::MetricBars);
    }

    #[test]
    fn switching_category_clears_sub_selection() {
        let mut nav = machine();
        nav.select_category(1).expect("valid");
        nav.select_sub_item(SubItem::Persona(2)).expect("valid persona");
        assert_eq!(nav.view(), ViewVariant::PersonaDetail(2));
        let state = nav.select_category(2).expect("valid");
        assert_eq!(state.sub_selection, SubSelection::None);
        assert_eq!(nav.view(), ViewVariant::MonthOverview);
    }

    #[test]
    fn persona_selection_wraps_both_ways() {
        let mut nav = machine();
        nav.select_category(1).expect("valid");
        nav.select_sub_item(SubItem::Persona(0)).expect("valid");
        assert_eq!(nav.prev_sub_item().expect("prev").sub_selection, SubSelection::PersonaIndex(2));
        assert_eq!(nav.next_sub_item().expect("next").sub_selection, SubSelection::PersonaIndex(0));
    }

    #[test]
    fn months_toggle() {
        let mut nav = machine();
        nav.select_category(2).expect("valid");
        nav.select_sub_item(SubItem::Month(MonthSlot::First)).expect("valid");
        assert_eq!(nav.next_sub_item().expect("next").sub_selection, SubSelection::Month(MonthSlot::Second));
        assert_eq!(nav.prev_sub_item().expect("prev").sub_selection, SubSelection::Month(MonthSlot::First));
        assert_eq!(nav.view(), ViewVariant::MonthDetail(MonthSlot::First));
    }

    #[test]
    fn single_month_stays_put() {
        let mut nav = NavigationStateMachine::new(vec![CategoryShape::months(1)]);
        nav.select_sub_item(SubItem::Month(MonthSlot::First)).expect("valid");
        assert!(nav.select_sub_item(SubItem::Month(MonthSlot::Second)).is_err());
        assert_eq!(nav.next_sub_item().expect("next").sub_selection, SubSelection::Month(MonthSlot::First));
    }

    #[test]
    fn rejections_leave_state_untouched() {
        let mut nav = machine();
        nav.select_category(1).expect("valid");
        let before = nav.state();
        assert_eq!(
            nav.select_sub_item(SubItem::Persona(3)),
            Err(NavigationRejection::SubItemOutOfRange { index: 3, count: 3 })
        );
        assert_eq!(
            nav.select_sub_item(SubItem::Month(MonthSlot::First)),
            Err(NavigationRejection::KindMismatch { kind: "overview-personas" })
        );
        assert_eq!(nav.next_sub_item(), Err(NavigationRejection::NothingSelected));
        assert_eq!(nav.state(), before);

        nav.select_category(0).expect("valid");
        assert_eq!(
            nav.select_sub_item(SubItem::Persona(0)),
            Err(NavigationRejection::NoNestedItems { kind: "metric-bars" })
        );
    }

    #[test]
    fn empty_report_renders_empty_view() {
        let mut nav = NavigationStateMachine::new(Vec::new());
        assert_eq!(nav.view(), ViewVariant::Empty);
        assert!(nav.select_category(0).is_err());
        assert!(nav.select_sub_item(SubItem::Persona(0)).is_err());
        assert!(nav.back().is_ok());
    }

    #[test]
    fn every_pair_maps_to_a_view() {
        let kinds = [
            CategoryKind::MetricBars,
            CategoryKind::OverviewPersonas,
            CategoryKind::NextStepsMonths,
            CategoryKind::Generic,
        ];
        let selections = [
            SubSelection::None,
            SubSelection::PersonaIndex(0),
            SubSelection::Month(MonthSlot::First),
            SubSelection::Month(MonthSlot::Second),
        ];
        for kind in kinds {
            for selection in selections {
                let view = derive_view(kind, selection);
                assert_ne!(view, ViewVariant::Empty, "{kind:?} + {selection:?}");
            }
        }
    }
}
