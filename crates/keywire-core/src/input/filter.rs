// Keywire Input Layer - Device Filtering
// Which devices the listener reads from

/// Device selection for the listener
///
/// With no names, every physical keyboard is used and our own virtual
/// device is skipped. With names, only devices whose path or name equals
/// one of them are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    names: Vec<String>,
}

impl DeviceFilter {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Accept every non-virtual keyboard
    pub fn autodetect() -> Self {
        Self::default()
    }

    pub fn is_autodetect(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matches(&self, name: &str, path: &str, is_keyboard: bool, is_virtual: bool) -> bool {
        if !self.names.is_empty() {
            return self.names.iter().any(|n| n == path || n == name);
        }
        is_keyboard && !is_virtual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_by_path() {
        let filter = DeviceFilter::new(vec!["/dev/input/event0".to_string()]);
        assert!(filter.matches("Logitech Keyboard", "/dev/input/event0", true, false));
        assert!(!filter.matches("Logitech Keyboard", "/dev/input/event1", true, false));
    }

    #[test]
    fn test_matches_by_name() {
        let filter = DeviceFilter::new(vec!["Logitech Keyboard".to_string()]);
        assert!(filter.matches("Logitech Keyboard", "/dev/input/event5", true, false));
        assert!(!filter.matches("Other Device", "/dev/input/event5", true, false));
    }

    #[test]
    fn test_autodetect() {
        let filter = DeviceFilter::autodetect();
        assert!(filter.is_autodetect());
        assert!(filter.matches("Generic Keyboard", "/dev/input/event0", true, false));
        assert!(!filter.matches("Generic Mouse", "/dev/input/event1", false, false));
        assert!(!filter.matches("Keywire (virtual) Keyboard", "/dev/input/event2", true, true));
    }

    #[test]
    fn test_explicit_match_includes_virtual() {
        let filter = DeviceFilter::new(vec!["Keywire (virtual) Keyboard".to_string()]);
        assert!(filter.matches("Keywire (virtual) Keyboard", "/dev/input/event2", true, true));
    }
}
