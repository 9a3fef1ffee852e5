// Keywire Key Code Map
// Logical key -> evdev code table built from the active layout

use indexmap::IndexMap;

use crate::keysym::keysym_to_key;
use crate::symbols::SymbolTable;
use crate::Key;

/// Canonical evdev codes used when layout discovery leaves a key unmapped
const FALLBACK_CODES: &[(Key, u16)] = &[
    // Common keys
    (Key::Space, 57),     // KEY_SPACE
    (Key::Enter, 28),     // KEY_ENTER
    (Key::Tab, 15),       // KEY_TAB
    (Key::Backspace, 14), // KEY_BACKSPACE
    (Key::Delete, 111),   // KEY_DELETE
    (Key::Escape, 1),     // KEY_ESC
    (Key::Left, 105),
    (Key::Right, 106),
    (Key::Up, 103),
    (Key::Down, 108),
    (Key::Home, 102),
    (Key::End, 107),
    (Key::PageUp, 104),
    (Key::PageDown, 109),
    (Key::Insert, 110),
    // Modifiers
    (Key::ShiftLeft, 42),   // KEY_LEFTSHIFT
    (Key::ShiftRight, 54),  // KEY_RIGHTSHIFT
    (Key::CtrlLeft, 29),    // KEY_LEFTCTRL
    (Key::CtrlRight, 97),   // KEY_RIGHTCTRL
    (Key::AltLeft, 56),     // KEY_LEFTALT
    (Key::AltRight, 100),   // KEY_RIGHTALT
    (Key::SuperLeft, 125),  // KEY_LEFTMETA
    (Key::SuperRight, 126), // KEY_RIGHTMETA
    // Locks
    (Key::CapsLock, 58),
    (Key::NumLock, 69),
    (Key::ScrollLock, 70),
    // Function keys
    (Key::F1, 59),
    (Key::F2, 60),
    (Key::F3, 61),
    (Key::F4, 62),
    (Key::F5, 63),
    (Key::F6, 64),
    (Key::F7, 65),
    (Key::F8, 66),
    (Key::F9, 67),
    (Key::F10, 68),
    (Key::F11, 87),
    (Key::F12, 88),
    (Key::F13, 183),
    (Key::F14, 184),
    (Key::F15, 185),
    (Key::F16, 186),
    (Key::F17, 187),
    (Key::F18, 188),
    (Key::F19, 189),
    (Key::F20, 190),
    // Letters
    (Key::A, 30),
    (Key::B, 48),
    (Key::C, 46),
    (Key::D, 32),
    (Key::E, 18),
    (Key::F, 33),
    (Key::G, 34),
    (Key::H, 35),
    (Key::I, 23),
    (Key::J, 36),
    (Key::K, 37),
    (Key::L, 38),
    (Key::M, 50),
    (Key::N, 49),
    (Key::O, 24),
    (Key::P, 25),
    (Key::Q, 16),
    (Key::R, 19),
    (Key::S, 31),
    (Key::T, 20),
    (Key::U, 22),
    (Key::V, 47),
    (Key::W, 17),
    (Key::X, 45),
    (Key::Y, 21),
    (Key::Z, 44),
    // Digits
    (Key::Num0, 11),
    (Key::Num1, 2),
    (Key::Num2, 3),
    (Key::Num3, 4),
    (Key::Num4, 5),
    (Key::Num5, 6),
    (Key::Num6, 7),
    (Key::Num7, 8),
    (Key::Num8, 9),
    (Key::Num9, 10),
    // Numpad
    (Key::Numpad0, 82),
    (Key::Numpad1, 79),
    (Key::Numpad2, 80),
    (Key::Numpad3, 81),
    (Key::Numpad4, 75),
    (Key::Numpad5, 76),
    (Key::Numpad6, 77),
    (Key::Numpad7, 71),
    (Key::Numpad8, 72),
    (Key::Numpad9, 73),
    (Key::NumpadDivide, 98),   // KEY_KPSLASH
    (Key::NumpadMultiply, 55), // KEY_KPASTERISK
    (Key::NumpadMinus, 74),
    (Key::NumpadPlus, 78),
    (Key::NumpadEnter, 96),
    (Key::NumpadDecimal, 83), // KEY_KPDOT
    // Misc
    (Key::Menu, 139),
    (Key::PrintScreen, 99), // KEY_SYSRQ
    (Key::Pause, 119),
    (Key::Mute, 113),
    (Key::VolumeDown, 114),
    (Key::VolumeUp, 115),
    (Key::MediaPlayPause, 164),
    (Key::MediaStop, 166), // KEY_STOPCD
    (Key::MediaNext, 163),
    (Key::MediaPrevious, 165),
    // Punctuation
    (Key::Grave, 41),
    (Key::Minus, 12),
    (Key::Equal, 13),
    (Key::LeftBracket, 26),  // KEY_LEFTBRACE
    (Key::RightBracket, 27), // KEY_RIGHTBRACE
    (Key::Backslash, 43),
    (Key::Semicolon, 39),
    (Key::Apostrophe, 40),
    (Key::Comma, 51),
    (Key::Period, 52), // KEY_DOT
    (Key::Slash, 53),
];

/// Key for an evdev code according to the fallback table
pub fn fallback_key_for_code(code: u16) -> Option<Key> {
    FALLBACK_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(k, _)| *k)
}

/// Mapping from logical keys to physical codes
///
/// Each key appears at most once; the first code recorded for a key is kept.
/// Iteration follows insertion order (discovery first, then fallbacks).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCodeMap {
    codes: IndexMap<Key, u16>,
}

impl KeyCodeMap {
    /// Discover codes from `table`, then fill gaps from the fallback table
    pub fn build(table: &dyn SymbolTable) -> Self {
        let mut map = Self::default();
        let discovered = map.discover(table);
        let filled = map.fill_fallbacks();
        log::debug!(
            "Key map: {} keys discovered from layout, {} from fallback table",
            discovered,
            filled
        );
        map
    }

    /// Map built from the fallback table alone
    pub fn fallback_only() -> Self {
        let mut map = Self::default();
        map.fill_fallbacks();
        map
    }

    fn insert_if_missing(&mut self, key: Key, code: u16) -> bool {
        if key == Key::Unknown || code == 0 || self.codes.contains_key(&key) {
            return false;
        }
        self.codes.insert(key, code);
        true
    }

    fn discover(&mut self, table: &dyn SymbolTable) -> usize {
        let mut added = 0;
        for code in table.physical_codes() {
            let Some(sym) = table.keysym(code) else {
                continue;
            };
            let key = keysym_to_key(sym, |s| table.keysym_name(s));
            if self.insert_if_missing(key, code) {
                added += 1;
            }
        }
        added
    }

    fn fill_fallbacks(&mut self) -> usize {
        FALLBACK_CODES
            .iter()
            .filter(|&&(key, code)| self.insert_if_missing(key, code))
            .count()
    }

    /// Physical code for `key`, if mapped
    pub fn resolve(&self, key: Key) -> Option<u16> {
        self.codes.get(&key).copied()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.codes.contains_key(&key)
    }

    /// First key registered for `code`
    pub fn key_for_code(&self, code: u16) -> Option<Key> {
        self.codes
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, u16)> + '_ {
        self.codes.iter().map(|(k, c)| (*k, *c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::Keysym;
    use crate::symbols::StaticSymbolTable;

    #[test]
    fn test_fallback_only_covers_table() {
        let map = KeyCodeMap::fallback_only();
        assert_eq!(map.len(), FALLBACK_CODES.len());
        for &(key, code) in FALLBACK_CODES {
            assert_eq!(map.resolve(key), Some(code), "{key}");
        }
        assert_eq!(map.resolve(Key::Unknown), None);
    }

    #[test]
    fn test_fallback_table_has_unique_keys() {
        let mut seen = std::collections::HashSet::new();
        for (key, _) in FALLBACK_CODES {
            assert!(seen.insert(*key), "duplicate fallback for {key}");
        }
    }

    #[test]
    fn test_discovery_from_us_layout() {
        let map = KeyCodeMap::build(&StaticSymbolTable::us_qwerty());
        assert_eq!(map.resolve(Key::A), Some(30));
        assert_eq!(map.resolve(Key::ShiftLeft), Some(42));
        assert_eq!(map.resolve(Key::Numpad7), Some(71));
        assert_eq!(map.resolve(Key::MediaPlayPause), Some(164));
        assert_eq!(map.key_for_code(30), Some(Key::A));
        // Discovery order puts Escape (code 1) first
        assert_eq!(map.iter().next(), Some((Key::Escape, 1)));
    }

    #[test]
    fn test_discovery_follows_layout() {
        // AZERTY-style: Q and A swapped
        let table = StaticSymbolTable::from_pairs([(16, Keysym::a), (30, Keysym(0x71))]);
        let map = KeyCodeMap::build(&table);
        assert_eq!(map.resolve(Key::A), Some(16));
        assert_eq!(map.resolve(Key::Q), Some(30));
        assert_eq!(map.resolve(Key::Z), Some(44));
    }

    #[test]
    fn test_discovery_lowest_code_wins() {
        let table = StaticSymbolTable::from_pairs([(40, Keysym::Return), (28, Keysym::Return)]);
        let map = KeyCodeMap::build(&table);
        assert_eq!(map.resolve(Key::Enter), Some(28));
    }

    #[test]
    fn test_discovery_skips_unknown_symbols() {
        let table = StaticSymbolTable::from_pairs([(30, Keysym(0xfe52))]);
        let map = KeyCodeMap::build(&table);
        assert_eq!(map.key_for_code(30), Some(Key::A));
        assert_eq!(map, KeyCodeMap::fallback_only());
    }

    #[test]
    fn test_rebuild_is_stable() {
        let table = StaticSymbolTable::us_qwerty();
        let first = KeyCodeMap::build(&table);
        let second = KeyCodeMap::build(&table);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }
}
