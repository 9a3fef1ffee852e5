// Keywire Input Layer - evdev Source
// Reads key events from /dev/input keyboards without grabbing them

use std::collections::VecDeque;
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use evdev::{Device, EventType};

use super::{
    is_keyboard, is_virtual_device, DeviceCapabilities, DeviceFilter, KeyEventSource,
    KeyboardInfo, ListenerError, RawKeyEvent, SourceProvider, EV_KEY,
};

/// Name prefix shared by every virtual device we create
const VIRTUAL_PREFIX: &str = "Keywire (virtual)";

fn capabilities_of(device: &Device) -> DeviceCapabilities {
    let keys: Vec<u16> = device
        .supported_keys()
        .map(|keys| keys.iter().map(|k| k.code()).collect())
        .unwrap_or_default();
    DeviceCapabilities::new(device.supported_events().contains(EventType::KEY), keys)
}

/// Every keyboard on the system, virtual ones included
pub fn list_keyboards() -> Vec<KeyboardInfo> {
    evdev::enumerate()
        .filter_map(|(path, device)| {
            if !is_keyboard(&capabilities_of(&device)) {
                return None;
            }
            let name = device.name().unwrap_or("Unknown").to_string();
            Some(KeyboardInfo {
                is_virtual: is_virtual_device(&name, VIRTUAL_PREFIX),
                name,
                path: path.display().to_string(),
            })
        })
        .collect()
}

/// Opens an [`EvdevSource`] over the devices accepted by its filter
#[derive(Debug, Clone, Default)]
pub struct EvdevProvider {
    filter: DeviceFilter,
}

impl EvdevProvider {
    pub fn new(filter: DeviceFilter) -> Self {
        Self { filter }
    }
}

impl SourceProvider for EvdevProvider {
    fn open(&self) -> Result<Box<dyn KeyEventSource>, ListenerError> {
        Ok(Box::new(EvdevSource::open(&self.filter)?))
    }
}

/// Key events from a set of evdev devices, multiplexed with poll(2)
pub struct EvdevSource {
    devices: Vec<Device>,
    pending: VecDeque<RawKeyEvent>,
}

impl EvdevSource {
    pub fn open(filter: &DeviceFilter) -> Result<Self, ListenerError> {
        let mut devices = Vec::new();
        for (path, device) in evdev::enumerate() {
            let name = device.name().unwrap_or("Unknown").to_string();
            let path = path.display().to_string();
            let keyboard = is_keyboard(&capabilities_of(&device));
            let virtual_device = is_virtual_device(&name, VIRTUAL_PREFIX);

            if filter.matches(&name, &path, keyboard, virtual_device) {
                log::info!("Listening on {} ({})", name, path);
                devices.push(device);
            }
        }

        if devices.is_empty() {
            return Err(ListenerError::NoDevices);
        }

        Ok(Self {
            devices,
            pending: VecDeque::new(),
        })
    }

    /// Wait up to `timeout` for input and buffer every key event read
    fn fill(&mut self, timeout: Duration) -> Result<(), ListenerError> {
        let mut poll_fds: Vec<libc::pollfd> = self
            .devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

        // SAFETY: poll_fds is a valid, exclusively borrowed array of pollfd
        // whose descriptors stay open for the duration of the call.
        let ready = unsafe {
            libc::poll(
                poll_fds.as_mut_ptr(),
                poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            // Interrupted by a signal: report as a timeout
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(());
            }
            return Err(ListenerError::Io(err));
        }
        if ready == 0 {
            return Ok(());
        }

        let mut gone = Vec::new();
        for (i, device) in self.devices.iter_mut().enumerate() {
            let revents = poll_fds[i].revents;
            if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                gone.push(i);
                continue;
            }
            if revents & libc::POLLIN == 0 {
                continue;
            }
            match device.fetch_events() {
                Ok(events) => self.pending.extend(
                    events
                        .filter(|ev| ev.event_type() == EventType::KEY)
                        .filter_map(|ev| RawKeyEvent::from_evdev(EV_KEY, ev.code(), ev.value())),
                ),
                Err(e) => {
                    log::warn!("Reading input device failed: {}", e);
                    gone.push(i);
                }
            }
        }

        for i in gone.into_iter().rev() {
            let device = self.devices.remove(i);
            log::info!("Keyboard {} went away", device.name().unwrap_or("Unknown"));
        }
        if self.devices.is_empty() {
            return Err(ListenerError::NoDevices);
        }
        Ok(())
    }
}

impl KeyEventSource for EvdevSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawKeyEvent>, ListenerError> {
        if self.pending.is_empty() {
            self.fill(timeout)?;
        }
        Ok(self.pending.pop_front())
    }
}
