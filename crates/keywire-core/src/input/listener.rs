// Keywire Listener
// Normalizes raw key events on a dedicated thread and hands them to a callback

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use parking_lot::Mutex;

use super::{default_provider, KeyEvent, KeyEventSource, ListenerError, RawKeyEvent, SourceProvider};
use crate::output::{fallback_key_for_code, ModifierTracker};
use crate::layout::LayoutIdentity;
use crate::settings::Settings;
use crate::symbols::{default_translator, KeyTranslator};
use crate::Key;

/// Longest a worker waits on its source before checking for cancellation
const POLL_SLICE: Duration = Duration::from_millis(100);

const WORKER_NAME: &str = "keywire-listener";

/// Builds a translator on the worker thread
pub type TranslatorFactory = Arc<dyn Fn() -> Box<dyn KeyTranslator> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ListenerState {
    NotStarted,
    Listening,
    Stopped,
}

struct Worker {
    handle: JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

/// Global key listener
///
/// `start`, `stop` and `is_listening` take `&self` and may be called from
/// any thread. The callback runs on the listener's own thread and is never
/// invoked after `stop` returns.
pub struct Listener {
    provider: Arc<dyn SourceProvider>,
    translators: TranslatorFactory,
    state: Arc<Mutex<ListenerState>>,
    worker: Mutex<Option<Worker>>,
    /// Thread of the most recently started worker
    worker_thread: Mutex<Option<ThreadId>>,
    /// Held by `stop` for the whole join so concurrent stoppers wait for it
    stopping: Mutex<()>,
}

impl Default for Listener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener {
    /// Listener configured from the user's settings file
    pub fn new() -> Self {
        let settings = Settings::load_default().unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {}; using defaults", e);
            Settings::new()
        });
        Self::from_settings(&settings)
    }

    /// Platform event source filtered by the settings' device list, with
    /// translation for the resolved layout
    pub fn from_settings(settings: &Settings) -> Self {
        let layout = settings.resolve_layout();
        let translators: TranslatorFactory = Arc::new(move || default_translator(&layout));
        Self::with_translator(default_provider(settings.listener_devices()), translators)
    }

    /// Listener over `provider` with the detected layout's translator
    pub fn with_provider(provider: impl SourceProvider + 'static) -> Self {
        let layout = LayoutIdentity::detect();
        Self::with_translator(
            Arc::new(provider),
            Arc::new(move || default_translator(&layout)),
        )
    }

    pub fn with_translator(provider: Arc<dyn SourceProvider>, translators: TranslatorFactory) -> Self {
        Self {
            provider,
            translators,
            state: Arc::new(Mutex::new(ListenerState::NotStarted)),
            worker: Mutex::new(None),
            worker_thread: Mutex::new(None),
            stopping: Mutex::new(()),
        }
    }

    pub fn state(&self) -> ListenerState {
        *self.state.lock()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == ListenerState::Listening
    }

    /// Start delivering events to `callback`, reporting why it could not
    pub fn try_start<F>(&self, callback: F) -> Result<(), ListenerError>
    where
        F: FnMut(KeyEvent) + Send + 'static,
    {
        let mut worker = self.worker.lock();
        if self.is_listening() {
            return Err(ListenerError::AlreadyListening);
        }

        // A worker that stopped on its own, or was stopped from its callback,
        // still needs joining. Restarting from that same callback detaches it.
        if let Some(finished) = worker.take() {
            if finished.handle.thread().id() != thread::current().id() {
                join_worker(finished);
            }
        }

        let source = self.provider.open()?;
        let stop = Arc::new(AtomicBool::new(false));

        let previous = std::mem::replace(&mut *self.state.lock(), ListenerState::Listening);

        let spawned = thread::Builder::new().name(WORKER_NAME.to_string()).spawn({
            let stop = Arc::clone(&stop);
            let state = Arc::clone(&self.state);
            let translators = Arc::clone(&self.translators);
            move || run_worker(source, translators(), callback, &stop, &state)
        });

        match spawned {
            Ok(handle) => {
                *self.worker_thread.lock() = Some(handle.thread().id());
                *worker = Some(Worker { handle, stop });
                log::debug!("Listener started");
                Ok(())
            }
            Err(e) => {
                *self.state.lock() = previous;
                Err(ListenerError::Io(e))
            }
        }
    }

    /// Start delivering events to `callback`
    ///
    /// Returns `false` and leaves the listener untouched if the event source
    /// cannot be opened or the listener is already running.
    pub fn start<F>(&self, callback: F) -> bool
    where
        F: FnMut(KeyEvent) + Send + 'static,
    {
        match self.try_start(callback) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Listener failed to start: {}", e);
                false
            }
        }
    }

    /// Stop listening and wait for the worker to exit
    ///
    /// A no-op if the listener never started or already stopped. Concurrent
    /// calls all return only once the worker has exited.
    ///
    /// When called from the callback itself the worker exits after the
    /// callback returns; the next `start` or `stop` from another thread
    /// joins it.
    pub fn stop(&self) {
        if *self.worker_thread.lock() == Some(thread::current().id()) {
            // A starter or stopper holding the slot has already cancelled us
            if let Some(worker) = self.worker.try_lock() {
                if let Some(worker) = worker.as_ref() {
                    worker.stop.store(true, Ordering::SeqCst);
                }
            }
            *self.state.lock() = ListenerState::Stopped;
            return;
        }

        let _stopping = self.stopping.lock();
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        worker.stop.store(true, Ordering::SeqCst);
        join_worker(worker);
        *self.state.lock() = ListenerState::Stopped;
        log::debug!("Listener stopped");
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join_worker(worker: Worker) {
    if worker.handle.join().is_err() {
        log::error!("Listener callback panicked");
    }
}

fn run_worker<F>(
    mut source: Box<dyn KeyEventSource>,
    mut translator: Box<dyn KeyTranslator>,
    mut callback: F,
    stop: &AtomicBool,
    state: &Mutex<ListenerState>,
) where
    F: FnMut(KeyEvent),
{
    let mut modifiers = ModifierTracker::new();

    while !stop.load(Ordering::SeqCst) {
        match source.next_event(POLL_SLICE) {
            Ok(Some(raw)) => {
                let event = normalize(translator.as_mut(), &mut modifiers, raw);
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                callback(event);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Listener source failed: {}", e);
                *state.lock() = ListenerState::Stopped;
                break;
            }
        }
    }
}

/// Resolve key, codepoint and modifier snapshot for one raw event
///
/// The snapshot includes the effect of the event itself.
pub fn normalize(
    translator: &mut dyn KeyTranslator,
    modifiers: &mut ModifierTracker,
    raw: RawKeyEvent,
) -> KeyEvent {
    let translation = translator.translate(raw.code, raw.pressed);
    let key = match translation.key {
        Key::Unknown => fallback_key_for_code(raw.code).unwrap_or(Key::Unknown),
        key => key,
    };

    if raw.pressed {
        modifiers.on_key_down(key);
    } else {
        modifiers.on_key_up(key);
    }

    KeyEvent {
        codepoint: translation.codepoint.filter(|c| !c.is_control()),
        key,
        mods: modifiers.active(),
        pressed: raw.pressed,
    }
}
