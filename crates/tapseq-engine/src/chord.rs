use std::collections::HashSet;

use rdev::Key;

/// The reserved chord that toggles capture on and off.
///
/// The chord is matched as a subset test against the currently held keys,
/// so it is order-independent and extra keys held alongside it do not
/// prevent a match. It is evaluated on every press in both the Active and
/// Inactive states.
#[derive(Debug, Clone)]
pub struct ToggleChord {
    keys: HashSet<Key>,
}

impl Default for ToggleChord {
    /// Left-ctrl + left-shift + F12
    fn default() -> Self {
        Self::new([Key::ControlLeft, Key::ShiftLeft, Key::F12])
    }
}

impl ToggleChord {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// True when every chord key is currently held
    pub fn matches(&self, held: &HashSet<Key>) -> bool {
        !self.keys.is_empty() && self.keys.is_subset(held)
    }
}
