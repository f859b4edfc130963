//! Observer seams for the engine's external collaborators.
//!
//! Every sink is notified at most once per triggering event. Sink failures
//! are logged by the engine and never propagated back into the listening
//! path.

use crate::error::{Error, Result};

/// Receives the live typed trail: the accumulated display string on every
/// normalized token, and an empty string when the trail is cleared.
pub trait OverlaySink: Send + Sync {
    fn display(&self, text: &str) -> Result<()>;
}

/// Receives the new capture state on every Active/Inactive transition
pub trait StatusSink: Send + Sync {
    fn active_changed(&self, active: bool) -> Result<()>;
}

/// Receives the "x,y" string produced by a cursor-position report
pub trait ClipboardSink: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Sink that drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OverlaySink for NullSink {
    fn display(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

impl StatusSink for NullSink {
    fn active_changed(&self, _active: bool) -> Result<()> {
        Ok(())
    }
}

impl ClipboardSink for NullSink {
    fn copy(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Clipboard sink backed by the system clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}
