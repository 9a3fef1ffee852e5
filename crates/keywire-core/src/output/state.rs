// Keywire Modifier State
// Software-side record of which modifiers are held

use crate::{Key, Modifier};

/// Bitmask of modifiers the sender believes are held
///
/// Only changes on explicit key transitions of modifier keys. There is no
/// reconciliation with the hardware state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierTracker {
    active: Modifier,
}

impl ModifierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; non-modifier keys are ignored
    pub fn on_key_down(&mut self, key: Key) {
        self.active = self.active.union(Modifier::from_key(key));
    }

    /// Record a key release; non-modifier keys are ignored
    pub fn on_key_up(&mut self, key: Key) {
        self.active = self.active.subtract(Modifier::from_key(key));
    }

    /// Modifiers currently held
    pub fn active(&self) -> Modifier {
        self.active
    }

    pub fn clear(&mut self) {
        self.active = Modifier::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_modifier_keys() {
        let mut state = ModifierTracker::new();
        state.on_key_down(Key::CtrlLeft);
        state.on_key_down(Key::ShiftRight);
        assert_eq!(state.active(), Modifier::CTRL | Modifier::SHIFT);

        state.on_key_up(Key::CtrlLeft);
        assert_eq!(state.active(), Modifier::SHIFT);
    }

    #[test]
    fn test_tracker_ignores_other_keys() {
        let mut state = ModifierTracker::new();
        state.on_key_down(Key::A);
        state.on_key_down(Key::CapsLock);
        assert_eq!(state.active(), Modifier::NONE);

        state.on_key_down(Key::AltRight);
        state.on_key_up(Key::A);
        assert_eq!(state.active(), Modifier::ALT);
    }

    #[test]
    fn test_tracker_left_right_share_bit() {
        // Releasing either side clears the bit even if the other is still down
        let mut state = ModifierTracker::new();
        state.on_key_down(Key::SuperLeft);
        state.on_key_down(Key::SuperRight);
        state.on_key_up(Key::SuperRight);
        assert_eq!(state.active(), Modifier::NONE);
    }

    #[test]
    fn test_tracker_clear() {
        let mut state = ModifierTracker::new();
        state.on_key_down(Key::ShiftLeft);
        state.clear();
        assert!(state.active().is_none());
    }
}
