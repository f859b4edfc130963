//! Action dispatch: mapping lookup and fire-and-forget execution.
//!
//! Each matched action runs on its own blocking task on the runtime's
//! worker pool. Tasks are never joined or tracked; failures are logged at
//! the task boundary and never reach the listening path.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use seqmap::{Action, HotkeySpec, MappingStore};

use crate::error::Result;
use crate::sink::{ClipboardSink, OverlaySink};
use crate::state::EngineState;
use crate::synth::{self, Injector};

pub(crate) struct Dispatcher {
    store: Arc<Mutex<MappingStore>>,
    injector: Arc<Mutex<dyn Injector>>,
    clipboard: Arc<dyn ClipboardSink>,
    overlay: Arc<dyn OverlaySink>,
    state: Arc<Mutex<EngineState>>,
    runtime: Handle,
}

impl Dispatcher {
    pub(crate) fn new(
        store: Arc<Mutex<MappingStore>>,
        injector: Arc<Mutex<dyn Injector>>,
        clipboard: Arc<dyn ClipboardSink>,
        overlay: Arc<dyn OverlaySink>,
        state: Arc<Mutex<EngineState>>,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            injector,
            clipboard,
            overlay,
            state,
            runtime,
        }
    }

    /// Probe the mapping tables with the accumulated sequence and fire the
    /// matched action, if any. Returns whether an action was dispatched.
    pub(crate) fn dispatch(&self, sequence: &str) -> bool {
        let action = {
            let store = self.store.lock().unwrap();
            match store.lookup(sequence) {
                Ok(action) => action,
                Err(e) => {
                    warn!("ignoring unusable mapping for {sequence:?}: {e}");
                    return false;
                }
            }
        };
        let Some(action) = action else {
            return false;
        };

        info!("sequence {sequence:?} matched: {action:?}");
        match action {
            Action::Replay(spec) => self.spawn_replay(spec),
            Action::Click { x, y } => self.spawn_click(x, y),
            Action::CursorReport => self.spawn_cursor_report(),
        }
        true
    }

    fn spawn_replay(&self, spec: HotkeySpec) {
        let injector = self.injector.clone();
        self.runtime.spawn_blocking(move || {
            let mut injector = injector.lock().unwrap();
            if let Err(e) = synth::replay(&mut *injector, &spec) {
                warn!("keystroke replay failed: {e}");
            }
        });
    }

    fn spawn_click(&self, x: i32, y: i32) {
        let injector = self.injector.clone();
        self.runtime.spawn_blocking(move || {
            let mut injector = injector.lock().unwrap();
            if let Err(e) = synth::click_at(&mut *injector, x, y) {
                warn!("mouse click failed: {e}");
            }
        });
    }

    /// Copy the pointer position to the clipboard, then restart the
    /// listening state. Reading the pointer can leave the hook's key
    /// tracking inconsistent, so the restart happens whether or not the
    /// report itself succeeded.
    fn spawn_cursor_report(&self) {
        let injector = self.injector.clone();
        let clipboard = self.clipboard.clone();
        let state = self.state.clone();
        let overlay = self.overlay.clone();
        self.runtime.spawn_blocking(move || {
            let report = || -> Result<()> {
                let position = {
                    let mut injector = injector.lock().unwrap();
                    synth::pointer_position(&mut *injector)?
                };
                clipboard.copy(&position)?;
                info!("cursor position {position} copied to clipboard");
                Ok(())
            };
            if let Err(e) = report() {
                warn!("cursor report failed: {e}");
            }

            state.lock().unwrap().force_reset();
            if let Err(e) = overlay.display("") {
                debug!("overlay notification failed: {e}");
            }
        });
    }
}
