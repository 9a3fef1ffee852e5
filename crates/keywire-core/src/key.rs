// Keywire Key Type
// Closed logical key taxonomy and name <-> key lookup

use std::str::FromStr;
use std::sync::OnceLock;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

/// A logical keyboard key, independent of any layout or platform code.
///
/// The discriminant is a stable ordinal and may be used as an array index
/// (see [`Key::ordinal`]). `Display` renders the canonical name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    IntoStaticStr,
)]
#[repr(u16)]
pub enum Key {
    Unknown,

    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Top-row digits
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,

    // Control and navigation
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,
    Menu,

    // Modifiers
    ShiftLeft,
    ShiftRight,
    CtrlLeft,
    CtrlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadDivide,
    NumpadMultiply,
    NumpadMinus,
    NumpadPlus,
    NumpadEnter,
    NumpadDecimal,

    // Punctuation (US positions)
    Grave,
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Apostrophe,
    Comma,
    Period,
    Slash,

    // Media
    Mute,
    VolumeDown,
    VolumeUp,
    MediaPlayPause,
    MediaStop,
    MediaNext,
    MediaPrevious,
}

/// Letters in alphabetical order, for range-based symbol mapping.
pub const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

/// Top-row digits 0-9.
pub const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

/// Numpad digits 0-9.
pub const NUMPAD_DIGITS: [Key; 10] = [
    Key::Numpad0,
    Key::Numpad1,
    Key::Numpad2,
    Key::Numpad3,
    Key::Numpad4,
    Key::Numpad5,
    Key::Numpad6,
    Key::Numpad7,
    Key::Numpad8,
    Key::Numpad9,
];

/// Function keys F1-F20.
pub const FUNCTION_KEYS: [Key; 20] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
    Key::F13,
    Key::F14,
    Key::F15,
    Key::F16,
    Key::F17,
    Key::F18,
    Key::F19,
    Key::F20,
];

impl Key {
    /// Stable ordinal of this key
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Canonical name of this key (same text as `Display`)
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// True for the left/right Shift, Ctrl, Alt and Super keys
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::CtrlLeft
                | Key::CtrlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::SuperLeft
                | Key::SuperRight
        )
    }

    /// Every key except `Unknown`, in ordinal order
    pub fn known() -> impl Iterator<Item = Key> {
        Key::iter().filter(|k| *k != Key::Unknown)
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Alternative spellings accepted by [`key_from_name`].
///
/// Includes the xkb keysym names that layout discovery falls back on, so the
/// same table serves both user-facing parsing and symbol resolution.
const ALIASES: &[(&str, Key)] = &[
    ("RETURN", Key::Enter),
    ("ESC", Key::Escape),
    ("BACK_SPACE", Key::Backspace),
    ("ISO_LEFT_TAB", Key::Tab),
    ("PRIOR", Key::PageUp),
    ("PAGE_UP", Key::PageUp),
    ("NEXT", Key::PageDown),
    ("PAGE_DOWN", Key::PageDown),
    ("DEL", Key::Delete),
    ("INS", Key::Insert),
    ("CAPS_LOCK", Key::CapsLock),
    ("NUM_LOCK", Key::NumLock),
    ("SCROLL_LOCK", Key::ScrollLock),
    ("PRINT", Key::PrintScreen),
    ("SYS_REQ", Key::PrintScreen),
    ("PRTSCR", Key::PrintScreen),
    ("BREAK", Key::Pause),
    ("APPS", Key::Menu),
    // Modifiers
    ("SHIFT", Key::ShiftLeft),
    ("SHIFT_L", Key::ShiftLeft),
    ("SHIFT_R", Key::ShiftRight),
    ("LSHIFT", Key::ShiftLeft),
    ("RSHIFT", Key::ShiftRight),
    ("CTRL", Key::CtrlLeft),
    ("CONTROL", Key::CtrlLeft),
    ("CONTROL_L", Key::CtrlLeft),
    ("CONTROL_R", Key::CtrlRight),
    ("LCTRL", Key::CtrlLeft),
    ("RCTRL", Key::CtrlRight),
    ("ALT", Key::AltLeft),
    ("ALT_L", Key::AltLeft),
    ("ALT_R", Key::AltRight),
    ("LALT", Key::AltLeft),
    ("RALT", Key::AltRight),
    ("META_L", Key::SuperLeft),
    ("META_R", Key::SuperRight),
    ("SUPER", Key::SuperLeft),
    ("SUPER_L", Key::SuperLeft),
    ("SUPER_R", Key::SuperRight),
    ("WIN", Key::SuperLeft),
    ("CMD", Key::SuperLeft),
    ("LSUPER", Key::SuperLeft),
    ("RSUPER", Key::SuperRight),
    // Numpad
    ("KP_0", Key::Numpad0),
    ("KP_1", Key::Numpad1),
    ("KP_2", Key::Numpad2),
    ("KP_3", Key::Numpad3),
    ("KP_4", Key::Numpad4),
    ("KP_5", Key::Numpad5),
    ("KP_6", Key::Numpad6),
    ("KP_7", Key::Numpad7),
    ("KP_8", Key::Numpad8),
    ("KP_9", Key::Numpad9),
    ("KP_DIVIDE", Key::NumpadDivide),
    ("KP_MULTIPLY", Key::NumpadMultiply),
    ("KP_SUBTRACT", Key::NumpadMinus),
    ("KP_ADD", Key::NumpadPlus),
    ("KP_ENTER", Key::NumpadEnter),
    ("KP_DECIMAL", Key::NumpadDecimal),
    // Punctuation
    ("BRACKETLEFT", Key::LeftBracket),
    ("BRACKETRIGHT", Key::RightBracket),
    ("PERIOD", Key::Period),
    ("DOT", Key::Period),
    // Media
    ("XF86AUDIOMUTE", Key::Mute),
    ("XF86AUDIOLOWERVOLUME", Key::VolumeDown),
    ("XF86AUDIORAISEVOLUME", Key::VolumeUp),
    ("XF86AUDIOPLAY", Key::MediaPlayPause),
    ("XF86AUDIOPAUSE", Key::MediaPlayPause),
    ("XF86AUDIOSTOP", Key::MediaStop),
    ("XF86AUDIONEXT", Key::MediaNext),
    ("XF86AUDIOPREV", Key::MediaPrevious),
    ("PLAYPAUSE", Key::MediaPlayPause),
];

/// Single printable characters accepted by [`key_from_name`].
fn key_from_char(c: char) -> Option<Key> {
    match c {
        'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
        'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
        '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
        ' ' => Some(Key::Space),
        '`' => Some(Key::Grave),
        '-' => Some(Key::Minus),
        '=' => Some(Key::Equal),
        '[' => Some(Key::LeftBracket),
        ']' => Some(Key::RightBracket),
        '\\' => Some(Key::Backslash),
        ';' => Some(Key::Semicolon),
        '\'' => Some(Key::Apostrophe),
        ',' => Some(Key::Comma),
        '.' => Some(Key::Period),
        '/' => Some(Key::Slash),
        _ => None,
    }
}

/// Try to parse a key name to a key
///
/// Accepts canonical names case-insensitively (`"enter"`, `"ShiftLeft"`),
/// the aliases above (`"Return"`, `"Control_L"`, `"XF86AudioPlay"`) and
/// single characters (`"a"`, `"1"`, `";"`). `"Unknown"` never parses.
pub fn key_from_name(name: &str) -> Option<Key> {
    let name = name.trim();
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return key_from_char(c);
    }

    let upper = name.to_uppercase();
    static CANONICAL: OnceLock<Vec<(String, Key)>> = OnceLock::new();
    let canonical = CANONICAL.get_or_init(|| {
        Key::known()
            .map(|k| (k.name().to_uppercase(), k))
            .collect()
    });

    canonical
        .iter()
        .find(|(n, _)| *n == upper)
        .map(|(_, k)| *k)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(n, _)| *n == upper)
                .map(|(_, k)| *k)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("a"), Some(Key::A));
        assert_eq!(key_from_name("A"), Some(Key::A));
        assert_eq!(key_from_name("Enter"), Some(Key::Enter));
        assert_eq!(key_from_name("ENTER"), Some(Key::Enter));
        assert_eq!(key_from_name("1"), Some(Key::Num1));
        assert_eq!(key_from_name("num0"), Some(Key::Num0));
        assert_eq!(key_from_name("Print"), Some(Key::PrintScreen));
        assert_eq!(key_from_name("Pause"), Some(Key::Pause));
    }

    #[test]
    fn test_key_from_keysym_names() {
        assert_eq!(key_from_name("Return"), Some(Key::Enter));
        assert_eq!(key_from_name("Shift_L"), Some(Key::ShiftLeft));
        assert_eq!(key_from_name("Control_R"), Some(Key::CtrlRight));
        assert_eq!(key_from_name("Super_L"), Some(Key::SuperLeft));
        assert_eq!(key_from_name("Caps_Lock"), Some(Key::CapsLock));
        assert_eq!(key_from_name("XF86AudioPlay"), Some(Key::MediaPlayPause));
        assert_eq!(key_from_name("KP_Enter"), Some(Key::NumpadEnter));
    }

    #[test]
    fn test_key_from_name_rejects_unknown() {
        assert_eq!(key_from_name("Unknown"), None);
        assert_eq!(key_from_name("NotAKey"), None);
        assert_eq!(key_from_name(""), None);
        assert!("dead_acute".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_display_roundtrip() {
        for key in Key::known() {
            assert_eq!(key_from_name(&key.to_string()), Some(key), "{key}");
        }
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::A.to_string(), "A");
        assert_eq!(Key::ShiftLeft.to_string(), "ShiftLeft");
        assert_eq!(Key::Num7.to_string(), "Num7");
    }

    #[test]
    fn test_key_ordinals_are_dense() {
        let ordinals: Vec<usize> = Key::iter().map(Key::ordinal).collect();
        assert_eq!(ordinals, (0..Key::COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_tables() {
        assert_eq!(LETTERS[25], Key::Z);
        assert_eq!(DIGITS[9], Key::Num9);
        assert_eq!(NUMPAD_DIGITS[0], Key::Numpad0);
        assert_eq!(FUNCTION_KEYS[19], Key::F20);
    }

    #[test]
    fn test_is_modifier() {
        assert!(Key::CtrlLeft.is_modifier());
        assert!(Key::SuperRight.is_modifier());
        assert!(!Key::CapsLock.is_modifier());
        assert!(!Key::A.is_modifier());
    }
}
