// Keywire Output Layer
// Backend abstraction, key code mapping and stateful key injection

mod keycode_map;
mod memory;
mod sender;
mod state;
#[cfg(all(target_os = "linux", feature = "uinput"))]
mod uinput;

pub use keycode_map::{fallback_key_for_code, KeyCodeMap};
pub use memory::{Emission, EmissionLog, MemoryBackend};
pub use sender::{Sender, SenderBuilder, DEFAULT_KEY_DELAY};
pub use state::ModifierTracker;
#[cfg(all(target_os = "linux", feature = "uinput"))]
pub use uinput::{UInputBackend, VIRTUAL_DEVICE_NAME};

/// Which kind of backend a [`Sender`] drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum BackendType {
    LinuxUInput,
    Memory,
    Unsupported,
}

/// What a backend can do; fixed once the backend is constructed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub can_inject_keys: bool,
    pub can_inject_text: bool,
    pub can_simulate_hid: bool,
    pub supports_key_repeat: bool,
    pub needs_accessibility_perm: bool,
    pub needs_input_monitoring_perm: bool,
    pub needs_uinput_access: bool,
}

/// Errors raised while setting up or writing to a backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),

    #[error("Device not initialized")]
    NotInitialized,
}

/// Raw emission primitive a [`Sender`] drives
///
/// Codes are backend-specific physical codes (evdev codes for uinput).
/// Emissions report success as `bool`; causes are logged by the backend.
pub trait Backend: Send {
    fn backend_type(&self) -> BackendType;

    fn capabilities(&self) -> Capabilities;

    fn is_ready(&self) -> bool;

    /// Ask for whatever runtime permission the backend needs
    fn request_permissions(&mut self) -> bool {
        self.is_ready()
    }

    /// Emit one key transition, followed by whatever sync the platform needs
    fn emit_key(&mut self, code: u16, down: bool) -> bool;

    /// Synchronization barrier
    fn sync(&mut self) -> bool;

    /// Inject text directly; only meaningful when `can_inject_text` is set
    fn type_text(&mut self, _text: &str) -> bool {
        false
    }
}

/// Backend for platforms without an injection primitive; never ready
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

impl Backend for UnsupportedBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Unsupported
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn emit_key(&mut self, _code: u16, _down: bool) -> bool {
        false
    }

    fn sync(&mut self) -> bool {
        false
    }
}

/// The injection backend for this platform and feature set
pub fn default_backend() -> Box<dyn Backend> {
    #[cfg(all(target_os = "linux", feature = "uinput"))]
    {
        Box::new(UInputBackend::open())
    }
    #[cfg(not(all(target_os = "linux", feature = "uinput")))]
    {
        log::warn!("No key injection backend built for this platform");
        Box::new(UnsupportedBackend)
    }
}
