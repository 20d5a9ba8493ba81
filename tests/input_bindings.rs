use report_deck::config::DeckConfig;
use report_deck::feedback::NoAffordance;
use report_deck::input::{Input, InputAction, InputEvent};
use report_deck::report::ReportData;
use report_deck::scene::NullSink;
use report_deck::time::ManualClock;
use report_deck::{Deck, DeckCollaborators};
use std::io::Write;
use tempfile::NamedTempFile;
use winit::keyboard::{Key, NamedKey};

fn press(input: &mut Input, key: Key) {
    input.push(InputEvent::Key { key, pressed: true });
}

#[test]
fn defaults_cover_digits_arrows_and_escape() {
    let mut input = Input::new();
    press(&mut input, Key::Character("3".into()));
    press(&mut input, Key::Named(NamedKey::ArrowRight));
    press(&mut input, Key::Named(NamedKey::ArrowLeft));
    press(&mut input, Key::Named(NamedKey::Escape));
    press(&mut input, Key::Character("M".into()));
    assert_eq!(input.take_actions(), vec![
        InputAction::SelectCategory(2),
        InputAction::NextSubItem,
        InputAction::PrevSubItem,
        InputAction::Back,
        InputAction::ToggleMusic,
    ]);
    assert!(input.take_actions().is_empty(), "actions drain once");
}

#[test]
fn remapped_keys_drive_the_deck() {
    let mut temp = NamedTempFile::new().expect("temp deck config");
    write!(temp, r#"{{"input": {{"bindings": {{"select_category_2": ["o"], "toggle_music": ["x"]}}}}}}"#)
        .expect("write remap config");
    let config = DeckConfig::load(temp.path()).expect("config parses");
    let report = ReportData::from_slice(
        br#"{"title": "T", "categories": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}]}"#,
    )
    .expect("report parses");
    let mut deck = Deck::new(
        config,
        report,
        DeckCollaborators {
            audio: Box::new(report_deck::audio::AudioManager::new(8)),
            cursor: Box::new(NoAffordance),
            clock: Box::new(ManualClock::new()),
        },
    );

    deck.push_input(InputEvent::Key { key: Key::Character("2".into()), pressed: true });
    deck.tick(1.0 / 60.0, &mut NullSink);
    assert_eq!(deck.state().active_category, 0, "default key no longer fires once remapped");

    deck.push_input(InputEvent::Key { key: Key::Character("o".into()), pressed: true });
    deck.tick(1.0 / 60.0, &mut NullSink);
    assert_eq!(deck.state().active_category, 1);

    assert!(deck.music_muted());
    deck.push_input(InputEvent::Key { key: Key::Character("x".into()), pressed: true });
    deck.tick(1.0 / 60.0, &mut NullSink);
    assert!(!deck.music_muted());
}

#[test]
fn drag_deltas_only_accumulate_while_held() {
    let mut input = Input::new();
    input.push(InputEvent::CursorPos { x: 10.0, y: 10.0 });
    input.push(InputEvent::CursorPos { x: 20.0, y: 10.0 });
    assert_eq!(input.take_drag_delta(), None);

    input.push(InputEvent::MouseButton { button: winit::event::MouseButton::Left, pressed: true });
    input.push(InputEvent::CursorPos { x: 25.0, y: 14.0 });
    input.push(InputEvent::CursorPos { x: 30.0, y: 18.0 });
    assert!(input.take_press());
    assert_eq!(input.take_drag_delta(), Some((10.0, 8.0)));
    input.push(InputEvent::MouseButton { button: winit::event::MouseButton::Left, pressed: false });
    assert!(input.take_release());
    assert!(!input.left_held());
}
