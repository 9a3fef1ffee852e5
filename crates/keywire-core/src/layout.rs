// Keywire Layout Detection
// Best-effort XKB rule names from environment, /etc/default/keyboard and locale

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Default location of the Debian-style keyboard configuration
pub const KEYBOARD_CONFIG_PATH: &str = "/etc/default/keyboard";

/// XKB rule names describing the active keyboard layout.
///
/// Any field may be empty, meaning "use the platform default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutIdentity {
    pub rules: String,
    pub model: String,
    pub layout: String,
    pub variant: String,
    pub options: String,
}

impl LayoutIdentity {
    /// Detect the layout from the process environment and the system keyboard file
    pub fn detect() -> Self {
        detect_layout_identity(&ProcessEnv, &FsFiles)
    }

    /// True when every field is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
            && self.model.is_empty()
            && self.layout.is_empty()
            && self.variant.is_empty()
            && self.options.is_empty()
    }

    fn has_missing_field(&self) -> bool {
        self.rules.is_empty()
            || self.model.is_empty()
            || self.layout.is_empty()
            || self.variant.is_empty()
            || self.options.is_empty()
    }

    fn field_mut(&mut self, config_key: &str) -> Option<&mut String> {
        match config_key {
            "XKBRULES" | "XKB_DEFAULT_RULES" => Some(&mut self.rules),
            "XKBMODEL" | "XKB_DEFAULT_MODEL" => Some(&mut self.model),
            "XKBLAYOUT" | "XKB_DEFAULT_LAYOUT" => Some(&mut self.layout),
            "XKBVARIANT" | "XKB_DEFAULT_VARIANT" => Some(&mut self.variant),
            "XKBOPTIONS" | "XKB_DEFAULT_OPTIONS" => Some(&mut self.options),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = if self.layout.is_empty() {
            "default"
        } else {
            self.layout.as_str()
        };
        write!(f, "{}", layout)?;
        if !self.variant.is_empty() {
            write!(f, "({})", self.variant)?;
        }
        if !self.model.is_empty() {
            write!(f, " model={}", self.model)?;
        }
        if !self.options.is_empty() {
            write!(f, " options={}", self.options)?;
        }
        Ok(())
    }
}

/// Source of environment variables
pub trait EnvProvider {
    fn var(&self, name: &str) -> Option<String>;
}

/// Source of whole-file text contents
pub trait FileProvider {
    fn read(&self, path: &Path) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFiles;

impl FileProvider for FsFiles {
    fn read(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

impl EnvProvider for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl FileProvider for HashMap<String, String> {
    fn read(&self, path: &Path) -> Option<String> {
        path.to_str().and_then(|p| self.get(p)).cloned()
    }
}

/// Resolve the layout identity from the supplied providers
///
/// Fields are filled in order from `XKB_DEFAULT_*`, then the keyboard
/// config file, then (layout only) the locale. Earlier sources win.
pub fn detect_layout_identity(env: &dyn EnvProvider, files: &dyn FileProvider) -> LayoutIdentity {
    let mut out = LayoutIdentity {
        rules: env_trimmed(env, "XKB_DEFAULT_RULES"),
        model: env_trimmed(env, "XKB_DEFAULT_MODEL"),
        layout: env_trimmed(env, "XKB_DEFAULT_LAYOUT"),
        variant: env_trimmed(env, "XKB_DEFAULT_VARIANT"),
        options: env_trimmed(env, "XKB_DEFAULT_OPTIONS"),
    };

    if out.has_missing_field() {
        if let Some(content) = files.read(Path::new(KEYBOARD_CONFIG_PATH)) {
            apply_keyboard_config(&mut out, &content);
        }
    }

    if out.layout.is_empty() {
        let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|name| env.var(name))
            .find(|value| !value.is_empty());
        if let Some(locale) = locale {
            if let Some(layout) = layout_from_locale(&locale) {
                log::debug!("Guessed layout '{}' from locale '{}'", layout, locale);
                out.layout = layout;
            }
        }
    }

    out
}

fn env_trimmed(env: &dyn EnvProvider, name: &str) -> String {
    env.var(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Fill empty fields from `KEY=VALUE` lines, first occurrence winning
fn apply_keyboard_config(out: &mut LayoutIdentity, content: &str) {
    for line in content.lines() {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        }
        .trim();

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_uppercase();
        let value = strip_quotes(value.trim()).trim();
        if value.is_empty() {
            continue;
        }

        if let Some(field) = out.field_mut(&key) {
            if field.is_empty() {
                *field = value.to_string();
            }
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Guess an XKB layout from a locale such as `en_GB.UTF-8` or `de_DE@euro`
pub fn layout_from_locale(locale: &str) -> Option<String> {
    let locale = locale.split('.').next().unwrap_or_default();
    let locale = locale.split('@').next().unwrap_or_default();

    let (lang, region) = match locale.split_once('_') {
        Some((lang, region)) => (lang.to_lowercase(), region.to_uppercase()),
        None => (locale.to_lowercase(), String::new()),
    };

    let layout = match (lang.as_str(), region.as_str()) {
        ("en", "GB" | "UK") => "gb",
        ("en", _) => "us",
        ("pt", "BR") => "br",
        ("da", _) => "dk",
        ("sv", _) => "se",
        ("", _) => return None,
        (other, _) => other,
    };
    Some(layout.to_string())
}
