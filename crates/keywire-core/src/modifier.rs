// Keywire Modifier System
// Modifier bitmask (Shift, Ctrl, Alt, Super) and key/modifier pairs

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::{key_from_name, Key};

bitflags! {
    /// Set of logical modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifier: u8 {
        const NONE  = 0;
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Fixed order in which modifiers are pressed and released
pub const MODIFIER_ORDER: [Modifier; 4] = [
    Modifier::SHIFT,
    Modifier::CTRL,
    Modifier::ALT,
    Modifier::SUPER,
];

impl Modifier {
    /// Clear every bit of `other` from `self`
    pub fn subtract(self, other: Modifier) -> Modifier {
        self.difference(other)
    }

    /// True when no modifier bit is set
    pub fn is_none(self) -> bool {
        self.is_empty()
    }

    /// Modifier bit carried by a physical modifier key, `NONE` otherwise
    pub fn from_key(key: Key) -> Modifier {
        match key {
            Key::ShiftLeft | Key::ShiftRight => Modifier::SHIFT,
            Key::CtrlLeft | Key::CtrlRight => Modifier::CTRL,
            Key::AltLeft | Key::AltRight => Modifier::ALT,
            Key::SuperLeft | Key::SuperRight => Modifier::SUPER,
            _ => Modifier::NONE,
        }
    }

    /// Left and right key variants for a single modifier bit
    pub fn keys(self) -> Option<(Key, Key)> {
        if self == Modifier::SHIFT {
            Some((Key::ShiftLeft, Key::ShiftRight))
        } else if self == Modifier::CTRL {
            Some((Key::CtrlLeft, Key::CtrlRight))
        } else if self == Modifier::ALT {
            Some((Key::AltLeft, Key::AltRight))
        } else if self == Modifier::SUPER {
            Some((Key::SuperLeft, Key::SuperRight))
        } else {
            None
        }
    }

    /// Set bits, one per entry, in press order
    pub fn bits_in_order(self) -> SmallVec<[Modifier; 4]> {
        MODIFIER_ORDER
            .iter()
            .copied()
            .filter(|m| self.contains(*m))
            .collect()
    }

    /// Parse a modifier name such as "Ctrl", "shift" or "Super"
    pub fn from_alias(name: &str) -> Option<Modifier> {
        match name.trim().to_uppercase().as_str() {
            "SHIFT" => Some(Modifier::SHIFT),
            "CTRL" | "CONTROL" | "C" => Some(Modifier::CTRL),
            "ALT" | "OPT" | "OPTION" | "A" => Some(Modifier::ALT),
            "SUPER" | "META" | "WIN" | "CMD" | "COMMAND" => Some(Modifier::SUPER),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let names: SmallVec<[&str; 4]> = self
            .bits_in_order()
            .into_iter()
            .map(|m| match m {
                m if m == Modifier::SHIFT => "Shift",
                m if m == Modifier::CTRL => "Ctrl",
                m if m == Modifier::ALT => "Alt",
                _ => "Super",
            })
            .collect();
        write!(f, "{}", names.join("+"))
    }
}

/// A key together with the modifiers that must be held around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyWithModifier {
    pub key: Key,
    pub required_mods: Modifier,
}

impl KeyWithModifier {
    pub fn new(key: Key, required_mods: Modifier) -> Self {
        Self { key, required_mods }
    }
}

impl From<Key> for KeyWithModifier {
    fn from(key: Key) -> Self {
        Self::new(key, Modifier::NONE)
    }
}

impl fmt::Display for KeyWithModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required_mods.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.required_mods, self.key)
        }
    }
}

/// Errors from parsing a combo string such as `"Ctrl+Shift+T"`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboParseError {
    #[error("combo string cannot be empty")]
    EmptyInput,

    #[error("unknown key name: '{0}'")]
    UnknownKey(String),

    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("combo string cannot end with '+'")]
    TrailingSeparator,
}

impl FromStr for KeyWithModifier {
    type Err = ComboParseError;

    /// Parse `Mod+Mod+Key`; the last component is always the key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ComboParseError::EmptyInput);
        }
        // "Ctrl++" taps the '+' key's base symbol, which has no Key
        if trimmed.ends_with('+') {
            return Err(ComboParseError::TrailingSeparator);
        }

        let mut parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
        let key_name = parts.pop().unwrap_or_default();
        let key = key_from_name(key_name)
            .ok_or_else(|| ComboParseError::UnknownKey(key_name.to_string()))?;

        let mut required_mods = Modifier::NONE;
        for part in parts {
            let modifier = Modifier::from_alias(part)
                .ok_or_else(|| ComboParseError::UnknownModifier(part.to_string()))?;
            required_mods |= modifier;
        }

        Ok(Self::new(key, required_mods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_union_contains() {
        let mods = Modifier::CTRL.union(Modifier::SHIFT);
        assert!(mods.contains(Modifier::CTRL));
        assert!(mods.contains(Modifier::SHIFT));
        assert!(!mods.contains(Modifier::ALT));
    }

    #[test]
    fn test_modifier_subtract() {
        let mods = Modifier::CTRL | Modifier::ALT;
        assert_eq!(mods.subtract(Modifier::ALT), Modifier::CTRL);
        assert_eq!(mods.subtract(Modifier::SHIFT), mods);
        assert!(mods.subtract(mods).is_none());
    }

    #[test]
    fn test_modifier_from_key() {
        assert_eq!(Modifier::from_key(Key::ShiftRight), Modifier::SHIFT);
        assert_eq!(Modifier::from_key(Key::CtrlLeft), Modifier::CTRL);
        assert_eq!(Modifier::from_key(Key::SuperRight), Modifier::SUPER);
        assert_eq!(Modifier::from_key(Key::CapsLock), Modifier::NONE);
        assert_eq!(Modifier::from_key(Key::A), Modifier::NONE);
    }

    #[test]
    fn test_bits_in_order() {
        let mods = Modifier::SUPER | Modifier::SHIFT | Modifier::ALT;
        assert_eq!(
            mods.bits_in_order().as_slice(),
            &[Modifier::SHIFT, Modifier::ALT, Modifier::SUPER]
        );
        assert!(Modifier::NONE.bits_in_order().is_empty());
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(
            Modifier::CTRL.keys(),
            Some((Key::CtrlLeft, Key::CtrlRight))
        );
        assert_eq!((Modifier::CTRL | Modifier::ALT).keys(), None);
    }

    #[test]
    fn test_modifier_display() {
        assert_eq!(Modifier::NONE.to_string(), "None");
        assert_eq!((Modifier::CTRL | Modifier::SHIFT).to_string(), "Shift+Ctrl");
        assert_eq!(
            KeyWithModifier::new(Key::C, Modifier::CTRL).to_string(),
            "Ctrl+C"
        );
    }

    #[test]
    fn test_modifier_from_alias() {
        assert_eq!(Modifier::from_alias("ctrl"), Some(Modifier::CTRL));
        assert_eq!(Modifier::from_alias("Super"), Some(Modifier::SUPER));
        assert_eq!(Modifier::from_alias("Opt"), Some(Modifier::ALT));
        assert_eq!(Modifier::from_alias("cmd"), Some(Modifier::SUPER));
        assert_eq!(Modifier::from_alias("hyper"), None);
    }

    #[test]
    fn test_parse_combo() {
        let combo: KeyWithModifier = "Ctrl+Shift+T".parse().unwrap();
        assert_eq!(combo, KeyWithModifier::new(Key::T, Modifier::CTRL | Modifier::SHIFT));

        let plain: KeyWithModifier = " enter ".parse().unwrap();
        assert_eq!(plain, KeyWithModifier::from(Key::Enter));

        let minus: KeyWithModifier = "Alt+-".parse().unwrap();
        assert_eq!(minus, KeyWithModifier::new(Key::Minus, Modifier::ALT));
    }

    #[test]
    fn test_parse_combo_errors() {
        assert_eq!("".parse::<KeyWithModifier>(), Err(ComboParseError::EmptyInput));
        assert_eq!("Ctrl+".parse::<KeyWithModifier>(), Err(ComboParseError::TrailingSeparator));
        assert_eq!(
            "Hyper+A".parse::<KeyWithModifier>(),
            Err(ComboParseError::UnknownModifier("Hyper".into()))
        );
        assert_eq!(
            "Ctrl+Bogus".parse::<KeyWithModifier>(),
            Err(ComboParseError::UnknownKey("Bogus".into()))
        );
    }
}
