//! OS input hook adapter.
//!
//! The hook owns a dedicated thread and delivers press/release callbacks to
//! the engine strictly serially. With the `unstable_grab` feature the hook
//! grabs events and can suppress a consumed toggle chord; otherwise it
//! listens passively and the chord also reaches other applications.

use std::thread;
use std::time::Duration;

use rdev::EventType;
use tracing::warn;

use crate::engine::{Engine, Verdict};
use crate::error::Error;

/// How long to wait before reinstalling a failed hook
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Install the global input hook on a dedicated thread
pub fn spawn(engine: Engine) -> thread::JoinHandle<()> {
    thread::spawn(move || run(engine))
}

fn run(engine: Engine) {
    #[cfg(feature = "unstable_grab")]
    {
        let grab_engine = engine.clone();
        match rdev::grab(move |event| match deliver(&grab_engine, &event) {
            Verdict::Consumed => None,
            Verdict::PassThrough => Some(event),
        }) {
            Ok(()) => return,
            Err(e) => {
                warn!("failed to grab input events: {e:?}, falling back to listening");
            }
        }
    }

    loop {
        let listen_engine = engine.clone();
        let result = rdev::listen(move |event| {
            deliver(&listen_engine, &event);
        });
        match result {
            Ok(()) => warn!("input hook exited unexpectedly, reinstalling shortly"),
            Err(e) => {
                let e = Error::Hook(format!("{e:?}"));
                warn!("{e}, retrying shortly");
            }
        }
        thread::sleep(RETRY_DELAY);
    }
}

fn deliver(engine: &Engine, event: &rdev::Event) -> Verdict {
    match event.event_type {
        EventType::KeyPress(key) => engine.handle_press(key, event.name.as_deref()),
        EventType::KeyRelease(key) => {
            engine.handle_release(key);
            Verdict::PassThrough
        }
        _ => Verdict::PassThrough,
    }
}
