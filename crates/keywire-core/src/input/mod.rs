// Keywire Input Layer
// Device detection, event sources and the global key listener

mod device;
mod event;
#[cfg(all(target_os = "linux", feature = "uinput"))]
mod evdev_source;
mod filter;
mod listener;
mod source;

pub use device::{is_keyboard, is_virtual_device, DeviceCapabilities, KeyboardInfo};
pub use event::{is_key_event, KeyEvent, RawKeyEvent, EV_KEY};
#[cfg(all(target_os = "linux", feature = "uinput"))]
pub use evdev_source::{list_keyboards, EvdevProvider, EvdevSource};
pub use filter::DeviceFilter;
pub use listener::{normalize, Listener, ListenerState, TranslatorFactory};
pub use source::{ChannelProvider, ChannelSource, KeyEventSource, SourceProvider, UnavailableProvider};

use std::sync::Arc;

/// Errors from starting or running a listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("No matching keyboard devices found")]
    NoDevices,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Listener is already running")]
    AlreadyListening,

    #[error("Key listening is not supported on this platform")]
    Unsupported,
}

/// Platform event source for the given device names (empty = all keyboards)
pub fn default_provider(devices: &[String]) -> Arc<dyn SourceProvider> {
    #[cfg(all(target_os = "linux", feature = "uinput"))]
    {
        Arc::new(EvdevProvider::new(DeviceFilter::new(devices.to_vec())))
    }
    #[cfg(not(all(target_os = "linux", feature = "uinput")))]
    {
        let _ = devices;
        Arc::new(UnavailableProvider)
    }
}
