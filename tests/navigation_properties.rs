use proptest::prelude::*;
use report_deck::navigation::{
    CategoryShape, MonthSlot, NavigationRejection, NavigationStateMachine, SubItem, SubSelection, ViewVariant,
};
use report_deck::report::CategoryKind;

fn deck_shapes(persona_count: usize) -> Vec<CategoryShape> {
    vec![
        CategoryShape::new(CategoryKind::MetricBars),
        CategoryShape::personas(persona_count),
        CategoryShape::months(2),
        CategoryShape::new(CategoryKind::Generic),
    ]
}

proptest! {
    #[test]
    fn next_wraps_back_to_the_start(count in 1usize..12, start in 0usize..12) {
        let start = start % count;
        let mut nav = NavigationStateMachine::new(deck_shapes(count));
        nav.select_category(1).expect("personas category exists");
        nav.select_sub_item(SubItem::Persona(start)).expect("index in range");
        for _ in 0..count {
            nav.next_sub_item().expect("next is valid with a selection");
        }
        prop_assert_eq!(nav.state().sub_selection, SubSelection::PersonaIndex(start));
    }

    #[test]
    fn prev_undoes_next(count in 1usize..12, start in 0usize..12) {
        let start = start % count;
        let mut nav = NavigationStateMachine::new(deck_shapes(count));
        nav.select_category(1).expect("personas category exists");
        nav.select_sub_item(SubItem::Persona(start)).expect("index in range");
        nav.next_sub_item().expect("next");
        nav.prev_sub_item().expect("prev");
        prop_assert_eq!(nav.state().sub_selection, SubSelection::PersonaIndex(start));
    }

    #[test]
    fn selecting_a_category_clears_the_sub_selection(category in 0usize..4, persona in 0usize..5) {
        let mut nav = NavigationStateMachine::new(deck_shapes(5));
        nav.select_category(1).expect("personas");
        nav.select_sub_item(SubItem::Persona(persona)).expect("persona");
        let state = nav.select_category(category).expect("category in range");
        prop_assert_eq!(state.active_category, category);
        prop_assert_eq!(state.sub_selection, SubSelection::None);
    }

    #[test]
    fn out_of_range_category_leaves_state_untouched(index in any::<i64>(), persona in 0usize..3) {
        prop_assume!(!(0..4).contains(&index));
        let mut nav = NavigationStateMachine::new(deck_shapes(3));
        nav.select_category(1).expect("personas");
        nav.select_sub_item(SubItem::Persona(persona)).expect("persona");
        let before = nav.state();
        let rejected = nav.select_category_signed(index);
        prop_assert_eq!(rejected, Err(NavigationRejection::CategoryOutOfRange { index, count: 4 }));
        prop_assert_eq!(nav.state(), before);
    }

    #[test]
    fn back_is_idempotent(presses in 1usize..5) {
        let mut nav = NavigationStateMachine::new(deck_shapes(3));
        nav.select_category(2).expect("months");
        nav.select_sub_item(SubItem::Month(MonthSlot::Second)).expect("month");
        for _ in 0..presses {
            let state = nav.back().expect("back never fails");
            prop_assert_eq!(state.sub_selection, SubSelection::None);
            prop_assert_eq!(state.active_category, 2);
        }
        prop_assert_eq!(nav.view(), ViewVariant::MonthOverview);
    }
}

#[test]
fn months_toggle_between_the_two_slots() {
    let mut nav = NavigationStateMachine::new(deck_shapes(1));
    nav.select_category(2).expect("months");
    nav.select_sub_item(SubItem::Month(MonthSlot::First)).expect("first month");
    assert_eq!(nav.view(), ViewVariant::MonthDetail(MonthSlot::First));
    nav.next_sub_item().expect("toggle");
    assert_eq!(nav.view(), ViewVariant::MonthDetail(MonthSlot::Second));
    nav.prev_sub_item().expect("toggle back");
    assert_eq!(nav.view(), ViewVariant::MonthDetail(MonthSlot::First));
}

#[test]
fn next_without_a_selection_is_rejected() {
    let mut nav = NavigationStateMachine::new(deck_shapes(3));
    nav.select_category(1).expect("personas");
    let before = nav.state();
    assert_eq!(nav.next_sub_item(), Err(NavigationRejection::NothingSelected));
    assert_eq!(nav.state(), before);
}

#[test]
fn nested_items_are_rejected_for_flat_categories() {
    let mut nav = NavigationStateMachine::new(deck_shapes(3));
    assert!(matches!(
        nav.select_sub_item(SubItem::Persona(0)),
        Err(NavigationRejection::NoNestedItems { .. })
    ));
    assert_eq!(nav.view(), ViewVariant::MetricBars);
}

#[test]
fn empty_deck_renders_the_empty_view() {
    let mut nav = NavigationStateMachine::new(Vec::new());
    assert_eq!(nav.view(), ViewVariant::Empty);
    assert!(nav.select_category(0).is_err());
    assert_eq!(nav.back().map(|state| state.sub_selection), Ok(SubSelection::None));
}
