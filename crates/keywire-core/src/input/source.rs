// Keywire Input Layer - Event Sources
// Where the listener reads raw key events from

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{ListenerError, RawKeyEvent};

/// A stream of raw key events
///
/// `next_event` waits at most `timeout` and returns `Ok(None)` when nothing
/// arrived, so the caller can check for cancellation between waits.
pub trait KeyEventSource: Send {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawKeyEvent>, ListenerError>;
}

/// Opens a fresh event source each time a listener starts
pub trait SourceProvider: Send + Sync {
    fn open(&self) -> Result<Box<dyn KeyEventSource>, ListenerError>;
}

/// Provider for platforms without a way to read key events
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

impl SourceProvider for UnavailableProvider {
    fn open(&self) -> Result<Box<dyn KeyEventSource>, ListenerError> {
        Err(ListenerError::Unsupported)
    }
}

/// Provider fed from an in-process channel
///
/// Events sent on the paired `mpsc::Sender` are delivered to whichever
/// source is currently open. Dropping every sender closes the source.
#[derive(Clone)]
pub struct ChannelProvider {
    receiver: Arc<Mutex<mpsc::Receiver<RawKeyEvent>>>,
}

impl ChannelProvider {
    pub fn new() -> (Self, mpsc::Sender<RawKeyEvent>) {
        let (tx, rx) = mpsc::channel();
        let provider = Self {
            receiver: Arc::new(Mutex::new(rx)),
        };
        (provider, tx)
    }
}

impl SourceProvider for ChannelProvider {
    fn open(&self) -> Result<Box<dyn KeyEventSource>, ListenerError> {
        Ok(Box::new(ChannelSource {
            receiver: Arc::clone(&self.receiver),
        }))
    }
}

/// Source reading from a [`ChannelProvider`]'s channel
pub struct ChannelSource {
    receiver: Arc<Mutex<mpsc::Receiver<RawKeyEvent>>>,
}

impl KeyEventSource for ChannelSource {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<RawKeyEvent>, ListenerError> {
        match self.receiver.lock().recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ListenerError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "event channel closed",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_provider() {
        assert!(matches!(
            UnavailableProvider.open(),
            Err(ListenerError::Unsupported)
        ));
    }

    #[test]
    fn test_channel_source_order_and_timeout() {
        let (provider, tx) = ChannelProvider::new();
        let mut source = provider.open().unwrap();

        tx.send(RawKeyEvent::press(30)).unwrap();
        tx.send(RawKeyEvent::release(30)).unwrap();

        let slice = Duration::from_millis(10);
        assert_eq!(source.next_event(slice).unwrap(), Some(RawKeyEvent::press(30)));
        assert_eq!(source.next_event(slice).unwrap(), Some(RawKeyEvent::release(30)));
        assert_eq!(source.next_event(slice).unwrap(), None);
    }

    #[test]
    fn test_channel_source_disconnect() {
        let (provider, tx) = ChannelProvider::new();
        let mut source = provider.open().unwrap();
        drop(tx);
        assert!(matches!(
            source.next_event(Duration::from_millis(10)),
            Err(ListenerError::Io(_))
        ));
    }
}
