// Keywire Keysym Mapping
// X11/xkb keysym values and keysym -> Key / codepoint resolution

use std::fmt;

use crate::key::{key_from_name, DIGITS, FUNCTION_KEYS, LETTERS, NUMPAD_DIGITS};
use crate::Key;

/// An X11/xkb keysym value. Zero means "no symbol".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Keysym(pub u32);

#[allow(non_upper_case_globals)]
impl Keysym {
    pub const NoSymbol: Keysym = Keysym(0);

    pub const space: Keysym = Keysym(0x0020);
    pub const apostrophe: Keysym = Keysym(0x0027);
    pub const comma: Keysym = Keysym(0x002c);
    pub const minus: Keysym = Keysym(0x002d);
    pub const period: Keysym = Keysym(0x002e);
    pub const slash: Keysym = Keysym(0x002f);
    pub const _0: Keysym = Keysym(0x0030);
    pub const _9: Keysym = Keysym(0x0039);
    pub const semicolon: Keysym = Keysym(0x003b);
    pub const equal: Keysym = Keysym(0x003d);
    pub const A: Keysym = Keysym(0x0041);
    pub const Z: Keysym = Keysym(0x005a);
    pub const bracketleft: Keysym = Keysym(0x005b);
    pub const backslash: Keysym = Keysym(0x005c);
    pub const bracketright: Keysym = Keysym(0x005d);
    pub const grave: Keysym = Keysym(0x0060);
    pub const a: Keysym = Keysym(0x0061);
    pub const z: Keysym = Keysym(0x007a);

    pub const BackSpace: Keysym = Keysym(0xff08);
    pub const Tab: Keysym = Keysym(0xff09);
    pub const Return: Keysym = Keysym(0xff0d);
    pub const Pause: Keysym = Keysym(0xff13);
    pub const Scroll_Lock: Keysym = Keysym(0xff14);
    pub const Escape: Keysym = Keysym(0xff1b);
    pub const Home: Keysym = Keysym(0xff50);
    pub const Left: Keysym = Keysym(0xff51);
    pub const Up: Keysym = Keysym(0xff52);
    pub const Right: Keysym = Keysym(0xff53);
    pub const Down: Keysym = Keysym(0xff54);
    pub const Page_Up: Keysym = Keysym(0xff55);
    pub const Page_Down: Keysym = Keysym(0xff56);
    pub const End: Keysym = Keysym(0xff57);
    pub const Print: Keysym = Keysym(0xff61);
    pub const Insert: Keysym = Keysym(0xff63);
    pub const Menu: Keysym = Keysym(0xff67);
    pub const Num_Lock: Keysym = Keysym(0xff7f);
    pub const KP_Enter: Keysym = Keysym(0xff8d);
    pub const KP_Multiply: Keysym = Keysym(0xffaa);
    pub const KP_Add: Keysym = Keysym(0xffab);
    pub const KP_Subtract: Keysym = Keysym(0xffad);
    pub const KP_Decimal: Keysym = Keysym(0xffae);
    pub const KP_Divide: Keysym = Keysym(0xffaf);
    pub const KP_0: Keysym = Keysym(0xffb0);
    pub const KP_9: Keysym = Keysym(0xffb9);
    pub const KP_Equal: Keysym = Keysym(0xffbd);
    pub const F1: Keysym = Keysym(0xffbe);
    pub const F20: Keysym = Keysym(0xffd1);
    pub const Shift_L: Keysym = Keysym(0xffe1);
    pub const Shift_R: Keysym = Keysym(0xffe2);
    pub const Control_L: Keysym = Keysym(0xffe3);
    pub const Control_R: Keysym = Keysym(0xffe4);
    pub const Caps_Lock: Keysym = Keysym(0xffe5);
    pub const Meta_L: Keysym = Keysym(0xffe7);
    pub const Meta_R: Keysym = Keysym(0xffe8);
    pub const Alt_L: Keysym = Keysym(0xffe9);
    pub const Alt_R: Keysym = Keysym(0xffea);
    pub const Super_L: Keysym = Keysym(0xffeb);
    pub const Super_R: Keysym = Keysym(0xffec);
    pub const Delete: Keysym = Keysym(0xffff);

    pub const XF86AudioLowerVolume: Keysym = Keysym(0x1008ff11);
    pub const XF86AudioMute: Keysym = Keysym(0x1008ff12);
    pub const XF86AudioRaiseVolume: Keysym = Keysym(0x1008ff13);
    pub const XF86AudioPlay: Keysym = Keysym(0x1008ff14);
    pub const XF86AudioStop: Keysym = Keysym(0x1008ff15);
    pub const XF86AudioPrev: Keysym = Keysym(0x1008ff16);
    pub const XF86AudioNext: Keysym = Keysym(0x1008ff17);
}

/// Names for the non-printable keysyms above
const NAMED: &[(Keysym, &str)] = &[
    (Keysym::BackSpace, "BackSpace"),
    (Keysym::Tab, "Tab"),
    (Keysym::Return, "Return"),
    (Keysym::Pause, "Pause"),
    (Keysym::Scroll_Lock, "Scroll_Lock"),
    (Keysym::Escape, "Escape"),
    (Keysym::Home, "Home"),
    (Keysym::Left, "Left"),
    (Keysym::Up, "Up"),
    (Keysym::Right, "Right"),
    (Keysym::Down, "Down"),
    (Keysym::Page_Up, "Prior"),
    (Keysym::Page_Down, "Next"),
    (Keysym::End, "End"),
    (Keysym::Print, "Print"),
    (Keysym::Insert, "Insert"),
    (Keysym::Menu, "Menu"),
    (Keysym::Num_Lock, "Num_Lock"),
    (Keysym::KP_Enter, "KP_Enter"),
    (Keysym::KP_Multiply, "KP_Multiply"),
    (Keysym::KP_Add, "KP_Add"),
    (Keysym::KP_Subtract, "KP_Subtract"),
    (Keysym::KP_Decimal, "KP_Decimal"),
    (Keysym::KP_Divide, "KP_Divide"),
    (Keysym::KP_Equal, "KP_Equal"),
    (Keysym::Shift_L, "Shift_L"),
    (Keysym::Shift_R, "Shift_R"),
    (Keysym::Control_L, "Control_L"),
    (Keysym::Control_R, "Control_R"),
    (Keysym::Caps_Lock, "Caps_Lock"),
    (Keysym::Meta_L, "Meta_L"),
    (Keysym::Meta_R, "Meta_R"),
    (Keysym::Alt_L, "Alt_L"),
    (Keysym::Alt_R, "Alt_R"),
    (Keysym::Super_L, "Super_L"),
    (Keysym::Super_R, "Super_R"),
    (Keysym::Delete, "Delete"),
    (Keysym::XF86AudioLowerVolume, "XF86AudioLowerVolume"),
    (Keysym::XF86AudioMute, "XF86AudioMute"),
    (Keysym::XF86AudioRaiseVolume, "XF86AudioRaiseVolume"),
    (Keysym::XF86AudioPlay, "XF86AudioPlay"),
    (Keysym::XF86AudioStop, "XF86AudioStop"),
    (Keysym::XF86AudioPrev, "XF86AudioPrev"),
    (Keysym::XF86AudioNext, "XF86AudioNext"),
];

impl Keysym {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Name of this keysym, for the subset the crate knows without xkb
    pub fn name(self) -> Option<String> {
        if let Some((_, name)) = NAMED.iter().find(|(sym, _)| *sym == self) {
            return Some((*name).to_string());
        }
        if (Keysym::KP_0.0..=Keysym::KP_9.0).contains(&self.0) {
            return Some(format!("KP_{}", self.0 - Keysym::KP_0.0));
        }
        if (Keysym::F1.0..=Keysym::F20.0).contains(&self.0) {
            return Some(format!("F{}", self.0 - Keysym::F1.0 + 1));
        }
        keysym_to_char(self).map(|c| c.to_string())
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "0x{:x}", self.0),
        }
    }
}

/// Map a keysym to a logical key
///
/// Tries, in order: letter range, digit range, function-key range, the
/// fixed table of named keys, then `name` looked up against the key
/// name table. `name` is only invoked when the tables miss.
pub fn keysym_to_key<F>(sym: Keysym, name: F) -> Key
where
    F: FnOnce(Keysym) -> Option<String>,
{
    let raw = sym.0;
    if (Keysym::a.0..=Keysym::z.0).contains(&raw) {
        return LETTERS[(raw - Keysym::a.0) as usize];
    }
    if (Keysym::A.0..=Keysym::Z.0).contains(&raw) {
        return LETTERS[(raw - Keysym::A.0) as usize];
    }
    if (Keysym::_0.0..=Keysym::_9.0).contains(&raw) {
        return DIGITS[(raw - Keysym::_0.0) as usize];
    }
    if (Keysym::F1.0..=Keysym::F20.0).contains(&raw) {
        return FUNCTION_KEYS[(raw - Keysym::F1.0) as usize];
    }
    if let Some(key) = named_keysym_to_key(sym) {
        return key;
    }

    name(sym)
        .and_then(|n| key_from_name(&n))
        .unwrap_or(Key::Unknown)
}

fn named_keysym_to_key(sym: Keysym) -> Option<Key> {
    if (Keysym::KP_0.0..=Keysym::KP_9.0).contains(&sym.0) {
        return Some(NUMPAD_DIGITS[(sym.0 - Keysym::KP_0.0) as usize]);
    }
    let key = match sym {
        Keysym::Return => Key::Enter,
        Keysym::BackSpace => Key::Backspace,
        Keysym::space => Key::Space,
        Keysym::Tab => Key::Tab,
        Keysym::Escape => Key::Escape,
        Keysym::Left => Key::Left,
        Keysym::Right => Key::Right,
        Keysym::Up => Key::Up,
        Keysym::Down => Key::Down,
        Keysym::Home => Key::Home,
        Keysym::End => Key::End,
        Keysym::Page_Up => Key::PageUp,
        Keysym::Page_Down => Key::PageDown,
        Keysym::Delete => Key::Delete,
        Keysym::Insert => Key::Insert,
        Keysym::KP_Divide => Key::NumpadDivide,
        Keysym::KP_Multiply => Key::NumpadMultiply,
        Keysym::KP_Subtract => Key::NumpadMinus,
        Keysym::KP_Add => Key::NumpadPlus,
        Keysym::KP_Enter => Key::NumpadEnter,
        Keysym::KP_Decimal => Key::NumpadDecimal,
        Keysym::comma => Key::Comma,
        Keysym::period => Key::Period,
        Keysym::slash => Key::Slash,
        Keysym::backslash => Key::Backslash,
        Keysym::semicolon => Key::Semicolon,
        Keysym::apostrophe => Key::Apostrophe,
        Keysym::minus => Key::Minus,
        Keysym::equal => Key::Equal,
        Keysym::grave => Key::Grave,
        Keysym::bracketleft => Key::LeftBracket,
        Keysym::bracketright => Key::RightBracket,
        _ => return None,
    };
    Some(key)
}

/// Best-effort character for a keysym, without consulting xkb
///
/// Covers Latin-1, the direct Unicode keysym range and the keypad.
/// Control characters yield `None`.
pub fn keysym_to_char(sym: Keysym) -> Option<char> {
    let raw = sym.0;
    let c = match raw {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(raw),
        0x0100_0100..=0x0110_ffff => char::from_u32(raw - 0x0100_0000),
        _ if (Keysym::KP_0.0..=Keysym::KP_9.0).contains(&raw) => {
            char::from_digit(raw - Keysym::KP_0.0, 10)
        }
        _ => match sym {
            Keysym::KP_Divide => Some('/'),
            Keysym::KP_Multiply => Some('*'),
            Keysym::KP_Subtract => Some('-'),
            Keysym::KP_Add => Some('+'),
            Keysym::KP_Decimal => Some('.'),
            Keysym::KP_Equal => Some('='),
            _ => None,
        },
    };
    c.filter(|c| !c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_name(_: Keysym) -> Option<String> {
        None
    }

    #[test]
    fn test_range_mapping() {
        assert_eq!(keysym_to_key(Keysym(0x71), no_name), Key::Q);
        assert_eq!(keysym_to_key(Keysym(0x51), no_name), Key::Q);
        assert_eq!(keysym_to_key(Keysym(0x35), no_name), Key::Num5);
        assert_eq!(keysym_to_key(Keysym::F1, no_name), Key::F1);
        assert_eq!(keysym_to_key(Keysym(0xffc9), no_name), Key::F12);
        assert_eq!(keysym_to_key(Keysym::F20, no_name), Key::F20);
    }

    #[test]
    fn test_named_mapping() {
        assert_eq!(keysym_to_key(Keysym::Return, no_name), Key::Enter);
        assert_eq!(keysym_to_key(Keysym::Page_Down, no_name), Key::PageDown);
        assert_eq!(keysym_to_key(Keysym(0xffb7), no_name), Key::Numpad7);
        assert_eq!(keysym_to_key(Keysym::KP_Subtract, no_name), Key::NumpadMinus);
        assert_eq!(keysym_to_key(Keysym::bracketright, no_name), Key::RightBracket);
    }

    #[test]
    fn test_name_fallback() {
        assert_eq!(keysym_to_key(Keysym::Shift_L, Keysym::name), Key::ShiftLeft);
        assert_eq!(keysym_to_key(Keysym::Super_R, Keysym::name), Key::SuperRight);
        assert_eq!(keysym_to_key(Keysym::Caps_Lock, Keysym::name), Key::CapsLock);
        assert_eq!(
            keysym_to_key(Keysym::XF86AudioRaiseVolume, Keysym::name),
            Key::VolumeUp
        );
        assert_eq!(keysym_to_key(Keysym::Shift_L, no_name), Key::Unknown);
    }

    #[test]
    fn test_name_not_consulted_for_ranges() {
        let key = keysym_to_key(Keysym(0x61), |_| panic!("name lookup"));
        assert_eq!(key, Key::A);
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(keysym_to_key(Keysym(0xfe52), Keysym::name), Key::Unknown);
        assert_eq!(keysym_to_key(Keysym::NoSymbol, Keysym::name), Key::Unknown);
    }

    #[test]
    fn test_keysym_to_char() {
        assert_eq!(keysym_to_char(Keysym(0x61)), Some('a'));
        assert_eq!(keysym_to_char(Keysym(0x40)), Some('@'));
        assert_eq!(keysym_to_char(Keysym(0xe9)), Some('é'));
        assert_eq!(keysym_to_char(Keysym(0x0100_20ac)), Some('€'));
        assert_eq!(keysym_to_char(Keysym(0xffb3)), Some('3'));
        assert_eq!(keysym_to_char(Keysym::KP_Add), Some('+'));
        assert_eq!(keysym_to_char(Keysym::Return), None);
        assert_eq!(keysym_to_char(Keysym::Shift_L), None);
    }

    #[test]
    fn test_keysym_name() {
        assert_eq!(Keysym::Page_Up.name().as_deref(), Some("Prior"));
        assert_eq!(Keysym(0xffb2).name().as_deref(), Some("KP_2"));
        assert_eq!(Keysym(0xffc2).name().as_deref(), Some("F5"));
        assert_eq!(Keysym(0x7a).name().as_deref(), Some("z"));
        assert_eq!(Keysym(0xfe52).to_string(), "0xfe52");
    }
}
