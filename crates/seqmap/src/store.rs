use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::{Action, parse_position};
use crate::error::{Error, Result};

/// The two sequence tables, as persisted in the mapping document.
///
/// Both tables map a literal typed sequence to a raw string value: a hotkey
/// spec or the cursor-report sentinel in `mappings`, an "x,y" position
/// literal in `mouse_mappings`. Values are kept as strings so the document
/// round-trips unchanged; they are interpreted at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingStore {
    #[serde(default)]
    mappings: BTreeMap<String, String>,
    #[serde(default)]
    mouse_mappings: BTreeMap<String, String>,
}

impl MappingStore {
    /// The default document: five conventional clipboard/editing shortcuts
    /// and an empty mouse table.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        for (sequence, hotkey) in [
            ("copy", "ctrl+c"),
            ("paste", "ctrl+v"),
            ("cut", "ctrl+x"),
            ("undo", "ctrl+z"),
            ("redo", "ctrl+y"),
        ] {
            store.mappings.insert(sequence.into(), hotkey.into());
        }
        store
    }

    /// Load the mapping document from `path`.
    ///
    /// A missing file is not an error: the seeded defaults are written to
    /// `path` and returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No mapping document at {path:?}, writing defaults");
            let store = Self::seeded();
            store.save(path)?;
            return Ok(store);
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load the mapping document, falling back to in-memory defaults if the
    /// file is unreadable or malformed. The broken file is left in place.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Failed to load mapping document: {e}, using defaults");
                Self::seeded()
            }
        }
    }

    /// Write the mapping document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The sequence → hotkey-value table
    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    /// The sequence → position-value table
    pub fn mouse_mappings(&self) -> &BTreeMap<String, String> {
        &self.mouse_mappings
    }

    /// Resolve a typed sequence to its action, probing the hotkey table
    /// first. A hit with an unusable value (a malformed position literal)
    /// surfaces as an error.
    pub fn lookup(&self, sequence: &str) -> Result<Option<Action>> {
        if let Some(value) = self.mappings.get(sequence) {
            return Ok(Some(Action::from_hotkey_value(value)));
        }
        match self.mouse_mappings.get(sequence) {
            Some(value) => Ok(Some(Action::from_mouse_value(value)?)),
            None => Ok(None),
        }
    }

    /// Bind a sequence to a hotkey value.
    ///
    /// Refuses an empty sequence or value, and a sequence already bound in
    /// the mouse table.
    pub fn add_mapping(&mut self, sequence: &str, hotkey: &str) -> Result<()> {
        let (sequence, hotkey) = (sequence.trim(), hotkey.trim());
        if sequence.is_empty() || hotkey.is_empty() {
            return Err(Error::Format(
                "sequence and hotkey must be non-empty".into(),
            ));
        }
        if self.mouse_mappings.contains_key(sequence) {
            return Err(Error::SequenceInUse(sequence.into()));
        }
        self.mappings.insert(sequence.into(), hotkey.into());
        Ok(())
    }

    /// Bind a sequence to an "x,y" click position.
    ///
    /// The position literal is validated before it is stored; a malformed
    /// literal leaves the table unchanged.
    pub fn add_mouse_mapping(&mut self, sequence: &str, position: &str) -> Result<()> {
        let (sequence, position) = (sequence.trim(), position.trim());
        if sequence.is_empty() || position.is_empty() {
            return Err(Error::Format(
                "sequence and position must be non-empty".into(),
            ));
        }
        parse_position(position)?;
        if self.mappings.contains_key(sequence) {
            return Err(Error::SequenceInUse(sequence.into()));
        }
        self.mouse_mappings.insert(sequence.into(), position.into());
        Ok(())
    }

    /// Remove a hotkey binding. Returns whether the sequence was bound.
    pub fn remove_mapping(&mut self, sequence: &str) -> bool {
        self.mappings.remove(sequence).is_some()
    }

    /// Remove a mouse binding. Returns whether the sequence was bound.
    pub fn remove_mouse_mapping(&mut self, sequence: &str) -> bool {
        self.mouse_mappings.remove(sequence).is_some()
    }

    /// Rebind a hotkey mapping under a new sequence
    pub fn update_mapping(&mut self, old_sequence: &str, sequence: &str, hotkey: &str) -> Result<()> {
        if self.mouse_mappings.contains_key(sequence.trim()) {
            return Err(Error::SequenceInUse(sequence.trim().into()));
        }
        self.remove_mapping(old_sequence);
        self.add_mapping(sequence, hotkey)
    }
}
