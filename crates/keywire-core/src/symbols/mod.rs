// Keywire Symbol Tables
// Resolve the keysym a physical key code produces under a layout

mod static_table;
#[cfg(feature = "xkb")]
mod xkb;

use std::ops::RangeInclusive;

pub use static_table::{StaticSymbolTable, StaticTranslator};
#[cfg(feature = "xkb")]
pub use xkb::{XkbSymbolTable, XkbTranslator};

use crate::keysym::Keysym;
use crate::layout::LayoutIdentity;
use crate::Key;

/// Errors from building a layout-backed symbol table
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("Failed to compile keymap for layout '{0}'")]
    KeymapCompile(String),
}

/// Layout lookup used by key code discovery
///
/// Codes are evdev key codes (the xkb keycode minus 8).
pub trait SymbolTable {
    /// Physical codes worth scanning, in ascending order
    fn physical_codes(&self) -> RangeInclusive<u16>;

    /// The symbol `code` produces with no modifiers or locks active
    fn keysym(&self, code: u16) -> Option<Keysym>;

    /// Textual name of a keysym (e.g. `Shift_L`)
    fn keysym_name(&self, sym: Keysym) -> Option<String>;
}

/// Result of translating one physical key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub key: Key,
    pub codepoint: Option<char>,
}

/// Stateful per-event translation used by the listener
///
/// Implementations track their own lock/shift state from the events fed in,
/// so each listener worker owns one.
pub trait KeyTranslator {
    fn translate(&mut self, code: u16, pressed: bool) -> Translation;
}

/// Symbol table for `identity`, preferring xkb when it is compiled in
pub fn default_symbol_table(identity: &LayoutIdentity) -> Box<dyn SymbolTable> {
    #[cfg(feature = "xkb")]
    {
        match XkbSymbolTable::new(identity) {
            Ok(table) => return Box::new(table),
            Err(e) => log::warn!("{}, using built-in US layout", e),
        }
    }
    #[cfg(not(feature = "xkb"))]
    log::debug!("xkb support not built in, using US layout instead of {}", identity);

    Box::new(StaticSymbolTable::us_qwerty())
}

/// Per-event translator for `identity`, preferring xkb when it is compiled in
pub fn default_translator(identity: &LayoutIdentity) -> Box<dyn KeyTranslator> {
    #[cfg(feature = "xkb")]
    {
        match XkbTranslator::new(identity) {
            Ok(translator) => return Box::new(translator),
            Err(e) => log::warn!("{}, using built-in US layout", e),
        }
    }
    #[cfg(not(feature = "xkb"))]
    let _ = identity;

    Box::new(StaticTranslator::new(StaticSymbolTable::us_qwerty()))
}
