// Keywire uinput Output Layer
// Virtual device creation and key event emission

use std::time::Duration;

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId};

use super::{Backend, BackendError, BackendType, Capabilities};

/// Name of the virtual keyboard; input sources skip devices with this prefix
pub const VIRTUAL_DEVICE_NAME: &str = "Keywire (virtual) Keyboard";

const VENDOR_ID: u16 = 0x1234;
const PRODUCT_ID: u16 = 0x5678;
const VERSION: u16 = 1;

/// Highest key code advertised by the virtual device
const MAX_KEY_CODE: u16 = 0x2ff;

/// Give udev and the compositor time to pick up a fresh device
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Virtual uinput keyboard
pub struct UInputBackend {
    device: Option<evdev::uinput::VirtualDevice>,
}

impl UInputBackend {
    /// Create the virtual device
    pub fn new() -> Result<Self, BackendError> {
        let mut keys = AttributeSet::new();
        for code in 1..=MAX_KEY_CODE {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| BackendError::DeviceCreation(e.to_string()))?
            .name(VIRTUAL_DEVICE_NAME)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, VERSION))
            .with_keys(&keys)
            .map_err(|e: std::io::Error| BackendError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| BackendError::DeviceCreation(e.to_string()))?;

        std::thread::sleep(SETTLE_DELAY);
        log::info!("Created virtual keyboard '{}'", VIRTUAL_DEVICE_NAME);

        Ok(Self {
            device: Some(device),
        })
    }

    /// Create the virtual device, keeping an inert backend if that fails
    ///
    /// The returned backend reports `LinuxUInput` either way; readiness
    /// tells whether the device exists.
    pub fn open() -> Self {
        match Self::new() {
            Ok(backend) => backend,
            Err(e) => {
                log::warn!("uinput unavailable ({}); check access to /dev/uinput", e);
                Self { device: None }
            }
        }
    }

    fn write(&mut self, events: &[InputEvent]) -> Result<(), BackendError> {
        let device = self.device.as_mut().ok_or(BackendError::NotInitialized)?;
        device
            .emit(events)
            .map_err(|e: std::io::Error| BackendError::WriteError(e.to_string()))
    }
}

/// Events for one key transition
///
/// `VirtualDevice::emit` appends the SYN_REPORT itself, so none is added here.
fn key_batch(code: u16, down: bool) -> [InputEvent; 1] {
    [InputEvent::new(EventType::KEY, code, i32::from(down))]
}

impl Backend for UInputBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::LinuxUInput
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            can_inject_keys: self.device.is_some(),
            can_inject_text: false,
            can_simulate_hid: true,
            supports_key_repeat: true,
            needs_accessibility_perm: false,
            needs_input_monitoring_perm: false,
            needs_uinput_access: true,
        }
    }

    fn is_ready(&self) -> bool {
        self.device.is_some()
    }

    fn emit_key(&mut self, code: u16, down: bool) -> bool {
        match self.write(&key_batch(code, down)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("uinput key {} {}: {}", code, if down { "down" } else { "up" }, e);
                false
            }
        }
    }

    fn sync(&mut self) -> bool {
        // An empty batch still gets its SYN_REPORT
        match self.write(&[]) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("uinput sync: {}", e);
                false
            }
        }
    }
}
