// Keywire xkb Symbol Table
// Layout lookups through libxkbcommon

use std::collections::HashSet;
use std::ops::RangeInclusive;

use xkbcommon::xkb;

use super::{KeyTranslator, SymbolError, SymbolTable, Translation};
use crate::keysym::{keysym_to_key, Keysym};
use crate::layout::LayoutIdentity;

/// evdev code -> xkb keycode offset
const XKB_OFFSET: u32 = 8;

fn compile_keymap(identity: &LayoutIdentity) -> Result<xkb::Keymap, SymbolError> {
    let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
    let options = if identity.options.is_empty() {
        None
    } else {
        Some(identity.options.clone())
    };

    xkb::Keymap::new_from_names(
        &context,
        &identity.rules,
        &identity.model,
        &identity.layout,
        &identity.variant,
        options,
        xkb::COMPILE_NO_FLAGS,
    )
    .ok_or_else(|| SymbolError::KeymapCompile(identity.to_string()))
}

fn xkb_keycode(code: u16) -> xkb::Keycode {
    xkb::Keycode::new(u32::from(code) + XKB_OFFSET)
}

fn xkb_keysym_name(sym: Keysym) -> Option<String> {
    let name = xkb::keysym_get_name(xkb::Keysym::new(sym.raw()));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Symbol table over a compiled xkb keymap, queried in its neutral state
pub struct XkbSymbolTable {
    keymap: xkb::Keymap,
    state: xkb::State,
}

impl XkbSymbolTable {
    pub fn new(identity: &LayoutIdentity) -> Result<Self, SymbolError> {
        let keymap = compile_keymap(identity)?;
        let state = xkb::State::new(&keymap);
        log::info!("Compiled xkb keymap for layout {}", identity);
        Ok(Self { keymap, state })
    }
}

impl SymbolTable for XkbSymbolTable {
    fn physical_codes(&self) -> RangeInclusive<u16> {
        let min = self.keymap.min_keycode().raw().saturating_sub(XKB_OFFSET).max(1);
        let max = self.keymap.max_keycode().raw().saturating_sub(XKB_OFFSET);
        let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
        clamp(min)..=clamp(max)
    }

    fn keysym(&self, code: u16) -> Option<Keysym> {
        let sym = self.state.key_get_one_sym(xkb_keycode(code)).raw();
        if sym == xkb::keysyms::KEY_NoSymbol {
            None
        } else {
            Some(Keysym(sym))
        }
    }

    fn keysym_name(&self, sym: Keysym) -> Option<String> {
        xkb_keysym_name(sym)
    }
}

/// Listener translator driving an xkb state machine
pub struct XkbTranslator {
    state: xkb::State,
    held: HashSet<u16>,
}

impl XkbTranslator {
    pub fn new(identity: &LayoutIdentity) -> Result<Self, SymbolError> {
        let keymap = compile_keymap(identity)?;
        Ok(Self {
            state: xkb::State::new(&keymap),
            held: HashSet::new(),
        })
    }
}

impl KeyTranslator for XkbTranslator {
    fn translate(&mut self, code: u16, pressed: bool) -> Translation {
        let keycode = xkb_keycode(code);

        // Symbol and text before the state update
        let sym = Keysym(self.state.key_get_one_sym(keycode).raw());
        let codepoint = char::from_u32(self.state.key_get_utf32(keycode))
            .filter(|c| *c != '\0' && !c.is_control());
        let key = keysym_to_key(sym, xkb_keysym_name);

        // Auto-repeat must not be fed to the state machine
        let changed = if pressed {
            self.held.insert(code)
        } else {
            self.held.remove(&code)
        };
        if changed {
            let direction = if pressed {
                xkb::KeyDirection::Down
            } else {
                xkb::KeyDirection::Up
            };
            self.state.update_key(keycode, direction);
        }

        Translation { key, codepoint }
    }
}
