use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rdev::Key;
use tokio::runtime::Handle;
use tracing::{info, warn};

use seqmap::MappingStore;

use crate::chord::ToggleChord;
use crate::dispatch::Dispatcher;
use crate::hook;
use crate::sink::{ClipboardSink, NullSink, OverlaySink, StatusSink};
use crate::state::EngineState;
use crate::synth::Injector;
use crate::token;

/// Whether the engine consumed an event (the toggle chord) or lets it
/// propagate to other applications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Consumed,
    PassThrough,
}

/// Configuration for the recognition engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Inactivity gap that invalidates the rolling buffer
    pub timeout: Duration,
    /// The capture toggle chord
    pub chord: ToggleChord,
    /// Whether the engine starts with capture enabled
    pub start_active: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            chord: ToggleChord::default(),
            start_active: true,
        }
    }
}

impl EngineConfig {
    /// Set the buffer inactivity timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the capture toggle chord
    pub fn with_chord(mut self, chord: ToggleChord) -> Self {
        self.chord = chord;
        self
    }

    /// Set whether capture is enabled at startup
    pub fn with_start_active(mut self, start_active: bool) -> Self {
        self.start_active = start_active;
        self
    }
}

/// Builder for [`Engine`]. Sinks default to [`NullSink`].
pub struct EngineBuilder {
    config: EngineConfig,
    store: Arc<Mutex<MappingStore>>,
    injector: Arc<Mutex<dyn Injector>>,
    overlay: Arc<dyn OverlaySink>,
    status: Arc<dyn StatusSink>,
    clipboard: Arc<dyn ClipboardSink>,
}

impl EngineBuilder {
    /// Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the overlay sink
    pub fn with_overlay(mut self, overlay: Arc<dyn OverlaySink>) -> Self {
        self.overlay = overlay;
        self
    }

    /// Set the status sink
    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    /// Set the clipboard sink
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Assemble the engine on the given runtime handle
    pub fn build(self, runtime: Handle) -> Engine {
        let state = Arc::new(Mutex::new(EngineState::new(self.config.start_active)));
        let dispatcher = Dispatcher::new(
            self.store,
            self.injector,
            self.clipboard,
            self.overlay.clone(),
            state.clone(),
            runtime.clone(),
        );
        Engine {
            inner: Arc::new(Inner {
                config: self.config,
                state,
                dispatcher,
                overlay: self.overlay,
                status: self.status,
                runtime,
            }),
        }
    }
}

struct Inner {
    config: EngineConfig,
    state: Arc<Mutex<EngineState>>,
    dispatcher: Dispatcher,
    overlay: Arc<dyn OverlaySink>,
    status: Arc<dyn StatusSink>,
    runtime: Handle,
}

/// The key-sequence recognition and dispatch engine.
///
/// One instance exists per process; clones share the same state. Raw
/// press/release events are delivered serially by the hook thread, so only
/// one event is ever being processed at a time. Matched actions run as
/// independent tasks and never touch the recognition state, with the single
/// exception of the cursor report's guarded listening restart.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    /// Start building an engine around a mapping store and an input backend
    pub fn builder(
        store: Arc<Mutex<MappingStore>>,
        injector: Arc<Mutex<dyn Injector>>,
    ) -> EngineBuilder {
        EngineBuilder {
            config: EngineConfig::default(),
            store,
            injector,
            overlay: Arc::new(NullSink),
            status: Arc::new(NullSink),
            clipboard: Arc::new(NullSink),
        }
    }

    /// Install the global input hook on a dedicated thread.
    ///
    /// The hook runs for the rest of the process lifetime; the toggle chord
    /// gates the full listening path rather than tearing the hook down.
    pub fn start(&self) {
        info!("starting input hook");
        hook::spawn(self.clone());
    }

    /// Feed one raw key press. `name` is the hook's unicode interpretation
    /// of the press, when it has one.
    pub fn handle_press(&self, key: Key, name: Option<&str>) -> Verdict {
        let mut state = self.inner.state.lock().unwrap();
        state.press(key);

        // The toggle chord is live in both states
        if self.inner.config.chord.matches(state.held()) {
            let active = state.toggle();
            drop(state);
            info!("capture toggled: active={active}");
            self.notify_status(active);
            return Verdict::Consumed;
        }

        if !state.is_active() {
            return Verdict::PassThrough;
        }

        let Some(token) = token::normalize(key, name) else {
            return Verdict::PassThrough;
        };

        let sequence = state.accept(&token, Instant::now(), self.inner.config.timeout);
        let display = state.display().to_string();
        drop(state);

        self.notify_overlay(&display);

        if self.inner.dispatcher.dispatch(&sequence) {
            // A fired action consumes the sequence; the next token starts a
            // fresh candidate
            self.inner.state.lock().unwrap().clear_sequence();
        }
        Verdict::PassThrough
    }

    /// Feed one raw key release. When the last held key is released, a
    /// one-shot clear of the typed trail is scheduled after the timeout;
    /// input arriving before it fires makes it a no-op.
    pub fn handle_release(&self, key: Key) {
        let mut state = self.inner.state.lock().unwrap();
        if state.release(key) {
            let generation = state.generation();
            drop(state);
            self.schedule_idle_clear(generation);
        }
    }

    /// Flip between Active and Inactive, clearing the held set
    pub fn toggle(&self) -> bool {
        let active = self.inner.state.lock().unwrap().toggle();
        info!("capture toggled: active={active}");
        self.notify_status(active);
        active
    }

    /// Whether the full listening path is currently engaged
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().unwrap().is_active()
    }

    /// Force a fresh listening state: held keys, buffer, and trail cleared,
    /// Active/Inactive state untouched
    pub fn restart_listening(&self) {
        self.inner.state.lock().unwrap().force_reset();
        self.notify_overlay("");
    }

    /// The lower-cased concatenation currently being matched
    pub fn current_sequence(&self) -> String {
        self.inner.state.lock().unwrap().sequence()
    }

    /// The number of physical keys currently tracked as held
    pub fn held_key_count(&self) -> usize {
        self.inner.state.lock().unwrap().held().len()
    }

    fn schedule_idle_clear(&self, generation: u64) {
        let engine = self.clone();
        let timeout = self.inner.config.timeout;
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let cleared = engine
                .inner
                .state
                .lock()
                .unwrap()
                .try_idle_clear(generation);
            if cleared {
                engine.notify_overlay("");
            }
        });
    }

    fn notify_overlay(&self, text: &str) {
        if let Err(e) = self.inner.overlay.display(text) {
            warn!("overlay sink failed: {e}");
        }
    }

    fn notify_status(&self, active: bool) {
        if let Err(e) = self.inner.status.active_changed(active) {
            warn!("status sink failed: {e}");
        }
    }
}
