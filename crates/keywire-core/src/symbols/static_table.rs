// Keywire Static Symbol Table
// Built-in US QWERTY layout for systems without libxkbcommon

use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

use super::{KeyTranslator, SymbolTable, Translation};
use crate::keysym::{keysym_to_char, keysym_to_key, Keysym};

/// (evdev code, unshifted keysym, shifted keysym)
const US_QWERTY: &[(u16, u32, u32)] = &[
    (1, 0xff1b, 0xff1b),           // KEY_ESC
    (2, b'1' as u32, b'!' as u32), // KEY_1
    (3, b'2' as u32, b'@' as u32),
    (4, b'3' as u32, b'#' as u32),
    (5, b'4' as u32, b'$' as u32),
    (6, b'5' as u32, b'%' as u32),
    (7, b'6' as u32, b'^' as u32),
    (8, b'7' as u32, b'&' as u32),
    (9, b'8' as u32, b'*' as u32),
    (10, b'9' as u32, b'(' as u32),
    (11, b'0' as u32, b')' as u32),
    (12, b'-' as u32, b'_' as u32),
    (13, b'=' as u32, b'+' as u32),
    (14, 0xff08, 0xff08), // KEY_BACKSPACE
    (15, 0xff09, 0xff09), // KEY_TAB
    (16, b'q' as u32, b'Q' as u32),
    (17, b'w' as u32, b'W' as u32),
    (18, b'e' as u32, b'E' as u32),
    (19, b'r' as u32, b'R' as u32),
    (20, b't' as u32, b'T' as u32),
    (21, b'y' as u32, b'Y' as u32),
    (22, b'u' as u32, b'U' as u32),
    (23, b'i' as u32, b'I' as u32),
    (24, b'o' as u32, b'O' as u32),
    (25, b'p' as u32, b'P' as u32),
    (26, b'[' as u32, b'{' as u32),
    (27, b']' as u32, b'}' as u32),
    (28, 0xff0d, 0xff0d), // KEY_ENTER
    (29, 0xffe3, 0xffe3), // KEY_LEFTCTRL
    (30, b'a' as u32, b'A' as u32),
    (31, b's' as u32, b'S' as u32),
    (32, b'd' as u32, b'D' as u32),
    (33, b'f' as u32, b'F' as u32),
    (34, b'g' as u32, b'G' as u32),
    (35, b'h' as u32, b'H' as u32),
    (36, b'j' as u32, b'J' as u32),
    (37, b'k' as u32, b'K' as u32),
    (38, b'l' as u32, b'L' as u32),
    (39, b';' as u32, b':' as u32),
    (40, b'\'' as u32, b'"' as u32),
    (41, b'`' as u32, b'~' as u32),
    (42, 0xffe1, 0xffe1), // KEY_LEFTSHIFT
    (43, b'\\' as u32, b'|' as u32),
    (44, b'z' as u32, b'Z' as u32),
    (45, b'x' as u32, b'X' as u32),
    (46, b'c' as u32, b'C' as u32),
    (47, b'v' as u32, b'V' as u32),
    (48, b'b' as u32, b'B' as u32),
    (49, b'n' as u32, b'N' as u32),
    (50, b'm' as u32, b'M' as u32),
    (51, b',' as u32, b'<' as u32),
    (52, b'.' as u32, b'>' as u32),
    (53, b'/' as u32, b'?' as u32),
    (54, 0xffe2, 0xffe2), // KEY_RIGHTSHIFT
    (55, 0xffaa, 0xffaa), // KEY_KPASTERISK
    (56, 0xffe9, 0xffe9), // KEY_LEFTALT
    (57, b' ' as u32, b' ' as u32),
    (58, 0xffe5, 0xffe5), // KEY_CAPSLOCK
    (59, 0xffbe, 0xffbe), // KEY_F1
    (60, 0xffbf, 0xffbf),
    (61, 0xffc0, 0xffc0),
    (62, 0xffc1, 0xffc1),
    (63, 0xffc2, 0xffc2),
    (64, 0xffc3, 0xffc3),
    (65, 0xffc4, 0xffc4),
    (66, 0xffc5, 0xffc5),
    (67, 0xffc6, 0xffc6),
    (68, 0xffc7, 0xffc7), // KEY_F10
    (69, 0xff7f, 0xff7f), // KEY_NUMLOCK
    (70, 0xff14, 0xff14), // KEY_SCROLLLOCK
    (71, 0xffb7, 0xffb7), // KEY_KP7
    (72, 0xffb8, 0xffb8),
    (73, 0xffb9, 0xffb9),
    (74, 0xffad, 0xffad), // KEY_KPMINUS
    (75, 0xffb4, 0xffb4), // KEY_KP4
    (76, 0xffb5, 0xffb5),
    (77, 0xffb6, 0xffb6),
    (78, 0xffab, 0xffab), // KEY_KPPLUS
    (79, 0xffb1, 0xffb1), // KEY_KP1
    (80, 0xffb2, 0xffb2),
    (81, 0xffb3, 0xffb3),
    (82, 0xffb0, 0xffb0), // KEY_KP0
    (83, 0xffae, 0xffae), // KEY_KPDOT
    (87, 0xffc8, 0xffc8), // KEY_F11
    (88, 0xffc9, 0xffc9), // KEY_F12
    (96, 0xff8d, 0xff8d), // KEY_KPENTER
    (97, 0xffe4, 0xffe4), // KEY_RIGHTCTRL
    (98, 0xffaf, 0xffaf), // KEY_KPSLASH
    (99, 0xff61, 0xff61), // KEY_SYSRQ
    (100, 0xffea, 0xffea), // KEY_RIGHTALT
    (102, 0xff50, 0xff50), // KEY_HOME
    (103, 0xff52, 0xff52), // KEY_UP
    (104, 0xff55, 0xff55), // KEY_PAGEUP
    (105, 0xff51, 0xff51), // KEY_LEFT
    (106, 0xff53, 0xff53), // KEY_RIGHT
    (107, 0xff57, 0xff57), // KEY_END
    (108, 0xff54, 0xff54), // KEY_DOWN
    (109, 0xff56, 0xff56), // KEY_PAGEDOWN
    (110, 0xff63, 0xff63), // KEY_INSERT
    (111, 0xffff, 0xffff), // KEY_DELETE
    (113, 0x1008ff12, 0x1008ff12), // KEY_MUTE
    (114, 0x1008ff11, 0x1008ff11), // KEY_VOLUMEDOWN
    (115, 0x1008ff13, 0x1008ff13), // KEY_VOLUMEUP
    (119, 0xff13, 0xff13), // KEY_PAUSE
    (125, 0xffeb, 0xffeb), // KEY_LEFTMETA
    (126, 0xffec, 0xffec), // KEY_RIGHTMETA
    (139, 0xff67, 0xff67), // KEY_MENU
    (163, 0x1008ff17, 0x1008ff17), // KEY_NEXTSONG
    (164, 0x1008ff14, 0x1008ff14), // KEY_PLAYPAUSE
    (165, 0x1008ff16, 0x1008ff16), // KEY_PREVIOUSSONG
    (166, 0x1008ff15, 0x1008ff15), // KEY_STOPCD
    (183, 0xffca, 0xffca), // KEY_F13
    (184, 0xffcb, 0xffcb),
    (185, 0xffcc, 0xffcc),
    (186, 0xffcd, 0xffcd),
    (187, 0xffce, 0xffce),
    (188, 0xffcf, 0xffcf),
    (189, 0xffd0, 0xffd0),
    (190, 0xffd1, 0xffd1), // KEY_F20
];

const CODE_CAPSLOCK: u16 = 58;
const CODE_LEFTSHIFT: u16 = 42;
const CODE_RIGHTSHIFT: u16 = 54;

/// Symbol table backed by a fixed code -> (base, shifted) keysym list
#[derive(Debug, Clone, Default)]
pub struct StaticSymbolTable {
    levels: BTreeMap<u16, (Keysym, Keysym)>,
}

impl StaticSymbolTable {
    /// The built-in US QWERTY layout
    pub fn us_qwerty() -> Self {
        Self::from_levels(
            US_QWERTY
                .iter()
                .map(|&(code, base, shifted)| (code, Keysym(base), Keysym(shifted))),
        )
    }

    /// Table from explicit (code, base, shifted) entries; later entries replace earlier ones
    pub fn from_levels<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, Keysym, Keysym)>,
    {
        let levels = entries
            .into_iter()
            .filter(|(code, _, _)| *code > 0)
            .map(|(code, base, shifted)| (code, (base, shifted)))
            .collect();
        Self { levels }
    }

    /// Table from (code, keysym) entries with no shifted level
    pub fn from_pairs<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, Keysym)>,
    {
        Self::from_levels(entries.into_iter().map(|(code, sym)| (code, sym, sym)))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Keysym for `code` at the requested shift level
    pub fn keysym_at(&self, code: u16, shifted: bool) -> Option<Keysym> {
        self.levels
            .get(&code)
            .map(|&(base, upper)| if shifted { upper } else { base })
            .filter(|sym| !sym.is_none())
    }
}

impl SymbolTable for StaticSymbolTable {
    fn physical_codes(&self) -> RangeInclusive<u16> {
        match (self.levels.keys().next(), self.levels.keys().next_back()) {
            (Some(&first), Some(&last)) => first..=last,
            #[allow(clippy::reversed_empty_ranges)]
            _ => 1..=0,
        }
    }

    fn keysym(&self, code: u16) -> Option<Keysym> {
        self.keysym_at(code, false)
    }

    fn keysym_name(&self, sym: Keysym) -> Option<String> {
        sym.name()
    }
}

/// Listener translator over a [`StaticSymbolTable`]
///
/// Tracks Shift and Caps Lock so letters and shifted punctuation produce
/// the expected characters.
#[derive(Debug, Clone)]
pub struct StaticTranslator {
    table: StaticSymbolTable,
    shift_down: HashSet<u16>,
    caps_lock: bool,
    caps_held: bool,
}

impl StaticTranslator {
    pub fn new(table: StaticSymbolTable) -> Self {
        Self {
            table,
            shift_down: HashSet::new(),
            caps_lock: false,
            caps_held: false,
        }
    }

    fn is_letter(&self, code: u16) -> bool {
        self.table
            .keysym_at(code, false)
            .is_some_and(|sym| (Keysym::a.0..=Keysym::z.0).contains(&sym.0))
    }
}

impl KeyTranslator for StaticTranslator {
    fn translate(&mut self, code: u16, pressed: bool) -> Translation {
        let shifted = !self.shift_down.is_empty() ^ (self.caps_lock && self.is_letter(code));
        let sym = self.table.keysym_at(code, shifted).unwrap_or_default();

        let translation = Translation {
            key: keysym_to_key(sym, Keysym::name),
            codepoint: keysym_to_char(sym),
        };

        match code {
            CODE_LEFTSHIFT | CODE_RIGHTSHIFT if pressed => {
                self.shift_down.insert(code);
            }
            CODE_LEFTSHIFT | CODE_RIGHTSHIFT => {
                self.shift_down.remove(&code);
            }
            CODE_CAPSLOCK if pressed => {
                if !self.caps_held {
                    self.caps_lock = !self.caps_lock;
                }
                self.caps_held = true;
            }
            CODE_CAPSLOCK => self.caps_held = false,
            _ => {}
        }

        translation
    }
}
