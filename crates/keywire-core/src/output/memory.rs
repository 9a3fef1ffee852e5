// Keywire Memory Backend
// In-process backend that records emissions instead of touching the OS

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Backend, BackendType, Capabilities};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Key { code: u16, down: bool },
    Sync,
    Text(String),
}

/// Shared handle on the emissions recorded by a [`MemoryBackend`]
///
/// Cloning shares the same log, so a caller can keep one after moving the
/// backend into a `Sender`.
#[derive(Debug, Clone, Default)]
pub struct EmissionLog {
    entries: Arc<Mutex<Vec<Emission>>>,
}

impl EmissionLog {
    fn push(&self, emission: Emission) {
        self.entries.lock().push(emission);
    }

    /// Everything recorded so far, in order
    pub fn all(&self) -> Vec<Emission> {
        self.entries.lock().clone()
    }

    /// Key transitions only, as (code, down)
    pub fn keys(&self) -> Vec<(u16, bool)> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match e {
                Emission::Key { code, down } => Some((*code, *down)),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Backend that records every call in an [`EmissionLog`]
///
/// Useful for dry runs and for driving a `Sender` in tests. Readiness,
/// text injection and emission failure can be toggled.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    log: EmissionLog,
    ready: bool,
    text_injection: bool,
    should_fail: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// A ready backend without text injection
    pub fn new() -> Self {
        Self {
            log: EmissionLog::default(),
            ready: true,
            text_injection: false,
            should_fail: false,
        }
    }

    /// Handle on the recorded emissions
    pub fn log(&self) -> EmissionLog {
        self.log.clone()
    }

    pub fn with_ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    pub fn with_text_injection(mut self, enabled: bool) -> Self {
        self.text_injection = enabled;
        self
    }

    /// Make every emission report failure without recording it
    pub fn with_failures(mut self, should_fail: bool) -> Self {
        self.should_fail = should_fail;
        self
    }
}

impl Backend for MemoryBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_inject_keys: self.ready,
            can_inject_text: self.text_injection,
            can_simulate_hid: true,
            supports_key_repeat: true,
            ..Capabilities::default()
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn emit_key(&mut self, code: u16, down: bool) -> bool {
        if self.should_fail {
            return false;
        }
        self.log.push(Emission::Key { code, down });
        true
    }

    fn sync(&mut self) -> bool {
        if self.should_fail {
            return false;
        }
        self.log.push(Emission::Sync);
        true
    }

    fn type_text(&mut self, text: &str) -> bool {
        if !self.text_injection || self.should_fail {
            return false;
        }
        self.log.push(Emission::Text(text.to_string()));
        true
    }
}
