// Keywire Settings Module
// User settings: key delay, layout override and listener device filter

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::layout::LayoutIdentity;
use crate::output::DEFAULT_KEY_DELAY;

/// Settings loaded from a TOML file (default: ~/.config/keywire/settings.toml)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Delay between tap halves and combo phases
    key_delay: Duration,

    /// Explicit layout, replacing detection when set
    layout_override: Option<LayoutIdentity>,

    /// Device paths or names the listener should read; empty means all keyboards
    listener_devices: Vec<String>,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    sender: Option<SenderSettings>,

    #[serde(default)]
    layout: Option<LayoutIdentity>,

    #[serde(default)]
    listener: Option<ListenerSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SenderSettings {
    #[serde(default)]
    key_delay_us: Option<i64>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct ListenerSettings {
    #[serde(default)]
    devices: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Settings with every value at its default
    pub fn new() -> Self {
        Self {
            key_delay: DEFAULT_KEY_DELAY,
            layout_override: None,
            listener_devices: Vec::new(),
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(delay) = toml_settings.sender.and_then(|s| s.key_delay_us) {
            let micros = u64::try_from(delay).map_err(|_| {
                SettingsError::InvalidValue(format!("key_delay_us must be >= 0, got {}", delay))
            })?;
            settings.key_delay = Duration::from_micros(micros);
        }

        // An all-empty [layout] table means "detect"
        settings.layout_override = toml_settings.layout.filter(|l| !l.is_empty());

        if let Some(listener) = toml_settings.listener {
            settings.listener_devices = listener
                .devices
                .into_iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keywire").join("settings.toml"))
    }

    /// Load from default location (~/.config/keywire/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    pub fn key_delay(&self) -> Duration {
        self.key_delay
    }

    pub fn set_key_delay(&mut self, delay: Duration) {
        self.key_delay = delay;
    }

    pub fn layout_override(&self) -> Option<&LayoutIdentity> {
        self.layout_override.as_ref()
    }

    pub fn set_layout_override(&mut self, layout: Option<LayoutIdentity>) {
        self.layout_override = layout;
    }

    /// Layout to use: the override if present, else detected from the system
    pub fn resolve_layout(&self) -> LayoutIdentity {
        self.layout_override
            .clone()
            .unwrap_or_else(LayoutIdentity::detect)
    }

    pub fn listener_devices(&self) -> &[String] {
        &self.listener_devices
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Keywire Settings
# Place this file at: ~/.config/keywire/settings.toml

[sender]
# Delay between press and release of a tap, in microseconds
key_delay_us = 1000

[layout]
# Leave empty to detect from XKB_DEFAULT_*, /etc/default/keyboard and locale
# layout = "de"
# variant = "nodeadkeys"
# model = "pc105"
# options = "ctrl:nocaps"

[listener]
# Restrict the listener to these devices (paths or names); empty = all keyboards
# devices = ["/dev/input/event3"]
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert_eq!(settings.key_delay(), Duration::from_micros(1000));
        assert!(settings.layout_override().is_none());
        assert!(settings.listener_devices().is_empty());
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
[sender]
key_delay_us = 2500

[layout]
layout = "de"
variant = "nodeadkeys"

[listener]
devices = ["/dev/input/event3", "  AT Translated Set 2 keyboard ", ""]
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.key_delay(), Duration::from_micros(2500));

        let layout = settings.layout_override().unwrap();
        assert_eq!(layout.layout, "de");
        assert_eq!(layout.variant, "nodeadkeys");
        assert_eq!(layout.rules, "");
        assert_eq!(settings.resolve_layout(), *layout);

        assert_eq!(
            settings.listener_devices(),
            &["/dev/input/event3".to_string(), "AT Translated Set 2 keyboard".to_string()]
        );
    }

    #[test]
    fn test_empty_layout_table_means_detect() {
        let settings = Settings::from_toml("[layout]\nlayout = \"\"\n").unwrap();
        assert!(settings.layout_override().is_none());
    }

    #[test]
    fn test_negative_delay_rejected() {
        let err = Settings::from_toml("[sender]\nkey_delay_us = -5\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = Settings::from_toml("[sender\n").unwrap_err();
        assert!(matches!(err, SettingsError::TomlParse(_)));
        let err = Settings::from_toml("[unknown]\nx = 1\n").unwrap_err();
        assert!(matches!(err, SettingsError::TomlParse(_)));
    }

    #[test]
    fn test_default_content_parses() {
        let settings = Settings::from_toml(default_settings_content()).unwrap();
        assert_eq!(settings, Settings::new());
    }

    #[test]
    fn test_reload_without_source() {
        let mut settings = Settings::new();
        assert!(matches!(settings.reload(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn test_from_file_and_reload() {
        let path = std::env::temp_dir().join(format!("keywire-settings-{}.toml", std::process::id()));
        std::fs::write(&path, "[sender]\nkey_delay_us = 0\n").unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.key_delay(), Duration::ZERO);
        assert_eq!(settings.source_path(), Some(path.as_path()));

        std::fs::write(&path, "[sender]\nkey_delay_us = 40\n").unwrap();
        settings.reload().unwrap();
        assert_eq!(settings.key_delay(), Duration::from_micros(40));

        std::fs::remove_file(&path).unwrap();
    }
}
