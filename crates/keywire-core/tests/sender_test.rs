// Keywire Sender Integration Tests
//
// Drives a Sender through the in-memory backend with the built-in US table:
// MemoryBackend <- Sender <- KeyCodeMap <- StaticSymbolTable

use std::time::Duration;

use keywire_core::output::{Emission, EmissionLog, KeyCodeMap, MemoryBackend};
use keywire_core::symbols::StaticSymbolTable;
use keywire_core::{Key, KeyWithModifier, LayoutIdentity, Modifier, Sender};

fn sender_on(backend: MemoryBackend) -> (Sender, EmissionLog) {
    let log = backend.log();
    let sender = Sender::builder()
        .backend(backend)
        .symbol_table(StaticSymbolTable::us_qwerty())
        .layout(LayoutIdentity::default())
        .key_delay(Duration::ZERO)
        .build();
    (sender, log)
}

fn memory_sender() -> (Sender, EmissionLog) {
    sender_on(MemoryBackend::new())
}

#[test]
fn test_fallback_table_always_present() {
    // A table that maps nothing still yields the fallback codes
    let (sender, _) = sender_on(MemoryBackend::new());
    let empty = KeyCodeMap::build(&StaticSymbolTable::default());
    assert_eq!(empty, KeyCodeMap::fallback_only());
    for key in [Key::Space, Key::Enter, Key::CtrlLeft, Key::F12, Key::A, Key::Num0] {
        assert!(empty.contains(key), "{key}");
        assert!(sender.key_map().contains(key), "{key}");
    }
}

#[test]
fn test_rebuild_gives_identical_map() {
    let (first, _) = memory_sender();
    let (second, _) = memory_sender();
    assert_eq!(first.key_map(), second.key_map());
}

#[test]
fn test_release_all_clears_state() {
    let (mut sender, _) = memory_sender();
    assert!(sender.hold_modifier(Modifier::all()));
    assert_eq!(sender.active_modifiers(), Modifier::all());

    assert!(sender.release_all_modifiers());
    assert_eq!(sender.active_modifiers(), Modifier::NONE);
}

#[test]
fn test_tap_preserves_held_modifiers() {
    let (mut sender, log) = memory_sender();
    assert!(sender.hold_modifier(Modifier::ALT));
    log.clear();

    assert!(sender.tap(Key::Tab));
    assert_eq!(sender.active_modifiers(), Modifier::ALT);
    assert_eq!(log.keys(), vec![(15, true), (15, false)]);

    assert!(sender.tap(KeyWithModifier::new(Key::Tab, Modifier::SHIFT)));
    // The required Shift is released again, Alt stays
    assert_eq!(sender.active_modifiers(), Modifier::ALT);
}

#[test]
fn test_combo_ctrl_c() {
    let (mut sender, log) = memory_sender();
    assert!(sender.combo(Modifier::CTRL, Key::C));
    assert_eq!(log.keys(), vec![(29, true), (46, true), (46, false), (29, false)]);
    assert_eq!(sender.active_modifiers(), Modifier::NONE);
}

#[test]
fn test_combo_phases_keep_ctrl_active() {
    let (mut sender, log) = memory_sender();

    assert!(sender.hold_modifier(Modifier::CTRL));
    assert_eq!(sender.active_modifiers(), Modifier::CTRL);
    assert!(sender.key_down(Key::C));
    assert_eq!(sender.active_modifiers(), Modifier::CTRL);
    assert!(sender.key_up(Key::C));
    assert_eq!(sender.active_modifiers(), Modifier::CTRL);
    assert!(sender.release_modifier(Modifier::CTRL));
    assert_eq!(sender.active_modifiers(), Modifier::NONE);

    assert_eq!(log.keys(), vec![(29, true), (46, true), (46, false), (29, false)]);
}

#[test]
fn test_type_text_without_injection() {
    let (mut sender, log) = memory_sender();
    assert!(!sender.capabilities().can_inject_text);
    assert!(!sender.type_text("hello"));
    assert!(!sender.type_character('h'));
    assert!(log.is_empty());
}

#[test]
fn test_type_text_with_injection() {
    let (mut sender, log) = sender_on(MemoryBackend::new().with_text_injection(true));
    assert!(sender.type_text("héllo"));
    assert_eq!(log.all(), vec![Emission::Text("héllo".to_string())]);
}

#[test]
fn test_unmapped_key_has_no_effect() {
    let (mut sender, log) = memory_sender();
    assert!(!sender.key_down(Key::Unknown));
    assert!(!sender.key_up(Key::Unknown));
    assert!(!sender.tap(KeyWithModifier::new(Key::Unknown, Modifier::CTRL)));
    assert!(log.is_empty());
    assert_eq!(sender.active_modifiers(), Modifier::NONE);
}

#[test]
fn test_not_ready_backend_has_no_effect() {
    let (mut sender, log) = sender_on(MemoryBackend::new().with_ready(false));
    assert!(!sender.is_ready());
    assert!(!sender.key_down(Key::ShiftLeft));
    assert!(!sender.flush());
    assert!(log.is_empty());
    assert_eq!(sender.active_modifiers(), Modifier::NONE);
}

#[test]
fn test_failed_emission_still_updates_state() {
    let (mut sender, log) = sender_on(MemoryBackend::new().with_failures(true));
    assert!(!sender.key_down(Key::ShiftLeft));
    assert_eq!(sender.active_modifiers(), Modifier::SHIFT);

    assert!(!sender.key_up(Key::ShiftLeft));
    assert_eq!(sender.active_modifiers(), Modifier::NONE);

    // Both halves are attempted even though the press failed
    assert!(!sender.combo(Modifier::CTRL, Key::C));
    assert_eq!(sender.active_modifiers(), Modifier::NONE);
    assert!(log.is_empty());
}

#[test]
fn test_layout_discovery_changes_codes() {
    // Q and A swapped, as on AZERTY
    let table = StaticSymbolTable::from_pairs([
        (16, keywire_core::Keysym(0x61)),
        (30, keywire_core::Keysym(0x71)),
    ]);
    let backend = MemoryBackend::new();
    let log = backend.log();
    let mut sender = Sender::builder()
        .backend(backend)
        .symbol_table(table)
        .layout(LayoutIdentity::default())
        .key_delay(Duration::ZERO)
        .build();

    assert!(sender.tap(Key::A));
    assert_eq!(log.keys(), vec![(16, true), (16, false)]);
}

#[test]
fn test_duplicate_symbol_keeps_lowest_code() {
    let table = StaticSymbolTable::from_pairs([
        (96, keywire_core::Keysym(0xff0d)),
        (28, keywire_core::Keysym(0xff0d)),
    ]);
    let map = KeyCodeMap::build(&table);
    assert_eq!(map.resolve(Key::Enter), Some(28));
}

#[test]
fn test_flush_emits_sync() {
    let (mut sender, log) = memory_sender();
    assert!(sender.flush());
    assert_eq!(log.all(), vec![Emission::Sync]);
}
