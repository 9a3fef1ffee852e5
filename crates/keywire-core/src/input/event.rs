// Keywire Input Layer - Event Types
// Raw device events and the normalized events handed to listeners

use crate::{Key, Modifier};

/// EV_KEY event type code from linux/input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// Check if an event is a key event.
pub fn is_key_event(event_type: u16) -> bool {
    event_type == EV_KEY
}

/// A key transition as read from a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// evdev key code
    pub code: u16,
    pub pressed: bool,
}

impl RawKeyEvent {
    pub fn new(code: u16, pressed: bool) -> Self {
        Self { code, pressed }
    }

    pub fn press(code: u16) -> Self {
        Self::new(code, true)
    }

    pub fn release(code: u16) -> Self {
        Self::new(code, false)
    }

    /// Build from an evdev (type, code, value) triple
    ///
    /// Non-key events yield `None`. Value 0 is a release; 1 (press) and
    /// 2 (auto-repeat) are both presses.
    pub fn from_evdev(event_type: u16, code: u16, value: i32) -> Option<Self> {
        if !is_key_event(event_type) {
            return None;
        }
        match value {
            0 => Some(Self::release(code)),
            1 | 2 => Some(Self::press(code)),
            _ => None,
        }
    }
}

/// Normalized key event delivered to a listener callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Best-effort character the key produces, if printable
    pub codepoint: Option<char>,
    pub key: Key,
    /// Modifiers held, as observed by the listener, after this event
    pub mods: Modifier,
    pub pressed: bool,
}
