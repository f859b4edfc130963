use std::collections::HashSet;
use std::time::{Duration, Instant};

use rdev::Key;

use crate::token::Token;

/// Rolling recognition state for the engine.
///
/// The held-key set and the token buffer are independent: chord detection
/// only consults the held set, sequence matching only consults the buffer.
/// Every buffer or trail mutation bumps the generation counter, which lets a
/// deferred idle clear detect that input arrived after it was scheduled.
#[derive(Debug)]
pub struct EngineState {
    active: bool,
    held: HashSet<Key>,
    buffer: Vec<String>,
    last_token: Option<Instant>,
    display: String,
    generation: u64,
}

impl EngineState {
    pub fn new(active: bool) -> Self {
        Self {
            active,
            held: HashSet::new(),
            buffer: Vec::new(),
            last_token: None,
            display: String::new(),
            generation: 0,
        }
    }

    /// Whether the full listening path is engaged
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip between Active and Inactive. Both transitions clear the held
    /// set so the chord cannot immediately re-trigger.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.held.clear();
        self.active
    }

    /// Record a key press in the held set
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Record a key release. A release for an untracked key is ignored.
    /// Returns true when no keys remain held.
    pub fn release(&mut self, key: Key) -> bool {
        self.held.remove(&key);
        self.held.is_empty()
    }

    /// The currently held physical keys
    pub fn held(&self) -> &HashSet<Key> {
        &self.held
    }

    /// Accept a normalized token: reset the buffer if the inactivity gap
    /// exceeded `timeout`, append, and return the full concatenation to be
    /// matched against the mapping tables.
    pub fn accept(&mut self, token: &Token, now: Instant, timeout: Duration) -> String {
        if let Some(last) = self.last_token {
            if now.duration_since(last) >= timeout {
                self.buffer.clear();
            }
        }
        self.buffer.push(token.canonical());
        self.last_token = Some(now);
        self.display.push_str(token.display());
        self.generation += 1;
        self.buffer.concat()
    }

    /// The lower-cased concatenation currently being matched
    pub fn sequence(&self) -> String {
        self.buffer.concat()
    }

    /// The typed trail mirrored to the overlay
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the matched sequence so the next token starts a fresh candidate.
    /// The on-screen trail is unaffected.
    pub fn clear_sequence(&mut self) {
        self.buffer.clear();
        self.generation += 1;
    }

    /// Apply a deferred idle clear scheduled at `generation`. A stale timer,
    /// one scheduled before further input arrived, is a no-op.
    pub fn try_idle_clear(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.buffer.clear();
        self.display.clear();
        self.generation += 1;
        true
    }

    /// Force a fresh listening state: held keys, buffer, and trail are all
    /// cleared; the Active/Inactive state is untouched.
    pub fn force_reset(&mut self) {
        self.held.clear();
        self.buffer.clear();
        self.display.clear();
        self.last_token = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::normalize;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn token(text: &str) -> Token {
        normalize(rdev::Key::KeyA, Some(text)).unwrap()
    }

    #[test]
    fn test_buffer_is_lowercased_concatenation() {
        let mut state = EngineState::new(true);
        let t0 = Instant::now();

        assert_eq!(state.accept(&token("A"), t0, TIMEOUT), "a");
        assert_eq!(
            state.accept(&token("b"), t0 + Duration::from_millis(300), TIMEOUT),
            "ab"
        );
        assert_eq!(
            state.accept(&token("C"), t0 + Duration::from_millis(600), TIMEOUT),
            "abc"
        );
        // The trail keeps the typed form
        assert_eq!(state.display(), "AbC");
    }

    #[test]
    fn test_timeout_gap_resets_buffer() {
        let mut state = EngineState::new(true);
        let t0 = Instant::now();

        state.accept(&token("a"), t0, TIMEOUT);
        state.accept(&token("b"), t0 + Duration::from_millis(500), TIMEOUT);
        // Gap over the timeout: only the later token survives
        let sequence = state.accept(&token("c"), t0 + Duration::from_millis(1600), TIMEOUT);
        assert_eq!(sequence, "c");
    }

    #[test]
    fn test_clear_sequence_keeps_trail() {
        let mut state = EngineState::new(true);
        state.accept(&token("a"), Instant::now(), TIMEOUT);
        state.clear_sequence();
        assert_eq!(state.sequence(), "");
        assert_eq!(state.display(), "a");
    }

    #[test]
    fn test_idle_clear_generation_gating() {
        let mut state = EngineState::new(true);
        let t0 = Instant::now();

        state.accept(&token("a"), t0, TIMEOUT);
        let scheduled_at = state.generation();

        // New input arrived before the timer fired: the clear must not apply
        state.accept(&token("b"), t0 + Duration::from_millis(100), TIMEOUT);
        assert!(!state.try_idle_clear(scheduled_at));
        assert_eq!(state.sequence(), "ab");

        // No input since the last accept: the clear applies
        let current = state.generation();
        assert!(state.try_idle_clear(current));
        assert_eq!(state.sequence(), "");
        assert_eq!(state.display(), "");
    }

    #[test]
    fn test_held_key_tracking() {
        let mut state = EngineState::new(true);
        state.press(rdev::Key::KeyA);
        state.press(rdev::Key::KeyB);
        assert!(!state.release(rdev::Key::KeyA));
        // Releasing an untracked key is ignored
        assert!(!state.release(rdev::Key::KeyZ));
        assert!(state.release(rdev::Key::KeyB));
    }

    #[test]
    fn test_toggle_clears_held_keys() {
        let mut state = EngineState::new(true);
        state.press(rdev::Key::ControlLeft);
        state.press(rdev::Key::F12);

        assert!(!state.toggle());
        assert!(state.held().is_empty());
        assert!(state.toggle());
        assert!(state.is_active());
    }

    #[test]
    fn test_force_reset_keeps_active_state() {
        let mut state = EngineState::new(true);
        state.press(rdev::Key::KeyA);
        state.accept(&token("a"), Instant::now(), TIMEOUT);

        state.force_reset();
        assert!(state.is_active());
        assert!(state.held().is_empty());
        assert_eq!(state.sequence(), "");
        assert_eq!(state.display(), "");
    }
}
