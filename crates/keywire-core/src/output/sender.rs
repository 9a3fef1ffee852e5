// Keywire Sender
// Layout-aware, modifier-tracking key injection over a Backend

use std::fmt;
use std::time::Duration;

use smallvec::SmallVec;

use super::{default_backend, Backend, BackendType, Capabilities, KeyCodeMap, ModifierTracker};
use crate::layout::LayoutIdentity;
use crate::settings::Settings;
use crate::symbols::{default_symbol_table, SymbolTable};
use crate::{Key, KeyWithModifier, Modifier};

/// Delay between the halves of a tap and around combo phases
pub const DEFAULT_KEY_DELAY: Duration = Duration::from_micros(1000);

/// Injects key events through a [`Backend`]
///
/// All operations report success as `bool` and log the cause of a failure.
/// The tracked modifier state follows the calls made through this sender,
/// not the hardware.
pub struct Sender {
    backend: Box<dyn Backend>,
    key_map: KeyCodeMap,
    modifiers: ModifierTracker,
    key_delay: Duration,
    layout: LayoutIdentity,
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("backend", &self.backend.backend_type())
            .field("keys_mapped", &self.key_map.len())
            .field("modifiers", &self.modifiers.active())
            .field("key_delay", &self.key_delay)
            .field("layout", &self.layout)
            .finish()
    }
}

impl Sender {
    /// Sender on the platform default backend and the detected layout
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SenderBuilder {
        SenderBuilder::new()
    }

    pub fn backend_type(&self) -> BackendType {
        self.backend.backend_type()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_ready()
    }

    /// Best-effort permission request; returns readiness afterwards
    pub fn request_permissions(&mut self) -> bool {
        self.backend.request_permissions()
    }

    /// Layout identity the key map was built for
    pub fn layout(&self) -> &LayoutIdentity {
        &self.layout
    }

    pub fn key_map(&self) -> &KeyCodeMap {
        &self.key_map
    }

    pub fn key_delay(&self) -> Duration {
        self.key_delay
    }

    pub fn set_key_delay(&mut self, delay: Duration) {
        self.key_delay = delay;
    }

    /// Modifiers this sender believes are held
    pub fn active_modifiers(&self) -> Modifier {
        self.modifiers.active()
    }

    /// Press the required modifiers (Shift, Ctrl, Alt, Super order), then the key
    pub fn key_down(&mut self, input: impl Into<KeyWithModifier>) -> bool {
        let input = input.into();
        let Some((code, mods)) = self.prepare(input) else {
            return false;
        };

        let mut ok = true;
        for (mod_key, mod_code) in mods {
            ok &= self.transition(mod_key, mod_code, true);
        }
        ok &= self.transition(input.key, code, true);
        ok
    }

    /// Release the key, then the required modifiers in the same order
    pub fn key_up(&mut self, input: impl Into<KeyWithModifier>) -> bool {
        let input = input.into();
        let Some((code, mods)) = self.prepare(input) else {
            return false;
        };

        let mut ok = self.transition(input.key, code, false);
        for (mod_key, mod_code) in mods {
            ok &= self.transition(mod_key, mod_code, false);
        }
        ok
    }

    /// `key_down`, key delay, `key_up`; the release is always attempted
    pub fn tap(&mut self, input: impl Into<KeyWithModifier>) -> bool {
        let input = input.into();
        let down = self.key_down(input);
        self.delay();
        let up = self.key_up(input);
        down && up
    }

    /// Press each modifier in `mods`, preferring the left key
    pub fn hold_modifier(&mut self, mods: Modifier) -> bool {
        self.modifier_transitions(mods, true)
    }

    /// Release each modifier in `mods`, preferring the left key
    pub fn release_modifier(&mut self, mods: Modifier) -> bool {
        self.modifier_transitions(mods, false)
    }

    pub fn release_all_modifiers(&mut self) -> bool {
        self.release_modifier(Modifier::all())
    }

    /// Hold `mods`, tap `key`, release `mods`; the release is always attempted
    pub fn combo(&mut self, mods: Modifier, key: Key) -> bool {
        let held = self.hold_modifier(mods);
        self.delay();
        let tapped = self.tap(key);
        self.delay();
        let released = self.release_modifier(mods);
        held && tapped && released
    }

    /// Inject text through the backend, if it supports direct text injection
    pub fn type_text(&mut self, text: &str) -> bool {
        if !self.backend.capabilities().can_inject_text {
            log::debug!(
                "{} backend cannot inject text, dropping {} chars",
                self.backend.backend_type(),
                text.chars().count()
            );
            return false;
        }
        if !self.backend.is_ready() {
            log::warn!("{} backend not ready", self.backend.backend_type());
            return false;
        }
        self.backend.type_text(text)
    }

    pub fn type_character(&mut self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.type_text(c.encode_utf8(&mut buf))
    }

    /// Ask the backend for a synchronization barrier
    pub fn flush(&mut self) -> bool {
        if !self.backend.is_ready() {
            log::warn!("{} backend not ready", self.backend.backend_type());
            return false;
        }
        self.backend.sync()
    }

    /// Readiness and resolution gate shared by key_down/key_up
    ///
    /// Returns the key's code and the (key, code) of each required modifier,
    /// or `None` without side effects.
    fn prepare(&self, input: KeyWithModifier) -> Option<(u16, SmallVec<[(Key, u16); 4]>)> {
        if !self.backend.is_ready() {
            log::warn!("{} backend not ready, dropping {}", self.backend.backend_type(), input);
            return None;
        }
        let Some(code) = self.key_map.resolve(input.key) else {
            log::debug!("No code mapping for {}", input.key);
            return None;
        };

        let mut mods = SmallVec::new();
        for bit in input.required_mods.bits_in_order() {
            match self.modifier_key(bit) {
                Some(pair) => mods.push(pair),
                None => {
                    log::debug!("No code mapping for modifier {} of {}", bit, input);
                    return None;
                }
            }
        }
        Some((code, mods))
    }

    /// Left variant of a single modifier bit if mapped, else the right one
    fn modifier_key(&self, bit: Modifier) -> Option<(Key, u16)> {
        let (left, right) = bit.keys()?;
        [left, right]
            .into_iter()
            .find_map(|key| self.key_map.resolve(key).map(|code| (key, code)))
    }

    fn modifier_transitions(&mut self, mods: Modifier, down: bool) -> bool {
        let mut ok = true;
        for bit in mods.bits_in_order() {
            ok &= match self.modifier_key(bit) {
                Some((key, _)) if down => self.key_down(key),
                Some((key, _)) => self.key_up(key),
                None => {
                    log::debug!("No code mapping for modifier {}", bit);
                    false
                }
            };
        }
        ok
    }

    /// Update the tracker, then emit; the tracker changes even if emission fails
    fn transition(&mut self, key: Key, code: u16, down: bool) -> bool {
        if down {
            self.modifiers.on_key_down(key);
        } else {
            self.modifiers.on_key_up(key);
        }
        let ok = self.backend.emit_key(code, down);
        log::debug!(
            "{} {} (code {}) -> {}",
            key,
            if down { "down" } else { "up" },
            code,
            ok
        );
        ok
    }

    fn delay(&self) {
        if !self.key_delay.is_zero() {
            std::thread::sleep(self.key_delay);
        }
    }
}

impl Default for Sender {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`Sender`] with explicit collaborators
pub struct SenderBuilder {
    backend: Option<Box<dyn Backend>>,
    symbols: Option<Box<dyn SymbolTable>>,
    layout: Option<LayoutIdentity>,
    key_delay: Duration,
    discovery: bool,
}

impl Default for SenderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SenderBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            symbols: None,
            layout: None,
            key_delay: DEFAULT_KEY_DELAY,
            discovery: true,
        }
    }

    /// Builder seeded from user settings (key delay and layout override)
    pub fn from_settings(settings: &Settings) -> Self {
        let mut builder = Self::new().key_delay(settings.key_delay());
        if let Some(layout) = settings.layout_override() {
            builder = builder.layout(layout.clone());
        }
        builder
    }

    pub fn backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    pub fn boxed_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn symbol_table(mut self, table: impl SymbolTable + 'static) -> Self {
        self.symbols = Some(Box::new(table));
        self
    }

    pub fn layout(mut self, layout: LayoutIdentity) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn key_delay(mut self, delay: Duration) -> Self {
        self.key_delay = delay;
        self
    }

    /// Skip layout discovery and use only the fallback code table
    pub fn without_discovery(mut self) -> Self {
        self.discovery = false;
        self
    }

    pub fn build(self) -> Sender {
        let layout = self.layout.unwrap_or_else(LayoutIdentity::detect);
        let backend = self.backend.unwrap_or_else(default_backend);

        let key_map = if !self.discovery {
            KeyCodeMap::fallback_only()
        } else {
            let symbols = self
                .symbols
                .unwrap_or_else(|| default_symbol_table(&layout));
            KeyCodeMap::build(symbols.as_ref())
        };

        log::info!(
            "Sender: backend={} ready={} layout={} keys={}",
            backend.backend_type(),
            backend.is_ready(),
            layout,
            key_map.len()
        );

        Sender {
            backend,
            key_map,
            modifiers: ModifierTracker::new(),
            key_delay: self.key_delay,
            layout,
        }
    }
}
