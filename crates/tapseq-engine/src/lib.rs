//! Key-sequence recognition and dispatch engine.
//!
//! The engine consumes the global key-event stream from an OS input hook,
//! normalizes each press into a token, accumulates tokens in a rolling
//! buffer with timeout-based invalidation, and matches the accumulated
//! sequence against the mapping tables. Matched actions (keystroke replay,
//! mouse click, cursor-position report) run as fire-and-forget tasks so the
//! listening path never blocks. A reserved chord toggles capture on and off
//! in both states.

pub mod chord;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod hook;
pub mod sink;
pub mod state;
pub mod synth;
pub mod token;

pub use chord::ToggleChord;
pub use engine::{Engine, EngineBuilder, EngineConfig, Verdict};
pub use error::{Error, Result};
pub use sink::{ClipboardSink, NullSink, OverlaySink, StatusSink, SystemClipboard};
pub use synth::{EnigoInjector, Injector};
pub use token::Token;
