// Keywire Input Layer - Device Detection
// Keyboard detection from device capabilities

use std::collections::HashSet;

/// Key capabilities of an input device
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// Supported key codes
    pub supported_keys: HashSet<u16>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: impl IntoIterator<Item = u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys: supported_keys.into_iter().collect(),
        }
    }

    pub fn supports_key(&self, key_code: u16) -> bool {
        self.supported_keys.contains(&key_code)
    }
}

// Q, W, E, R, T, Y
const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];

// SPACE, A, Z
const A_Z_SPACE_CODES: &[u16] = &[57, 30, 44];

/// A device is a keyboard if it reports EV_KEY with the QWERTY row, A, Z and Space.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    capabilities.has_ev_key
        && QWERTY_CODES
            .iter()
            .chain(A_Z_SPACE_CODES)
            .all(|code| capabilities.supports_key(*code))
}

/// Devices whose name contains `prefix` were created by us and must not be read back.
pub fn is_virtual_device(name: &str, prefix: &str) -> bool {
    name.contains(prefix)
}

/// A keyboard found while scanning input devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardInfo {
    pub name: String,
    pub path: String,
    /// Created by our own output backend
    pub is_virtual: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_caps() -> DeviceCapabilities {
        let mut keys: Vec<u16> = QWERTY_CODES.to_vec();
        keys.extend_from_slice(A_Z_SPACE_CODES);
        keys.extend_from_slice(&[2, 3, 4, 14, 15, 28, 29, 42, 56]);
        DeviceCapabilities::new(true, keys)
    }

    #[test]
    fn test_is_keyboard_with_full_keyboard() {
        assert!(is_keyboard(&keyboard_caps()));
    }

    #[test]
    fn test_is_keyboard_missing_keys() {
        let caps = DeviceCapabilities::new(true, QWERTY_CODES.iter().copied());
        assert!(!is_keyboard(&caps));

        let caps = DeviceCapabilities::new(true, A_Z_SPACE_CODES.iter().copied());
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_needs_ev_key() {
        let mut caps = keyboard_caps();
        caps.has_ev_key = false;
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_keyboard_mouse_device() {
        // BTN_LEFT, BTN_RIGHT, BTN_MIDDLE
        let caps = DeviceCapabilities::new(true, [272, 273, 274]);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_is_virtual_device() {
        assert!(is_virtual_device("Keywire (virtual) Keyboard", "Keywire (virtual)"));
        assert!(!is_virtual_device("Logitech USB Keyboard", "Keywire (virtual)"));
    }
}
