//! Synthetic input: keystroke replay, mouse clicks, and pointer queries.

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::{debug, warn};

use seqmap::HotkeySpec;

use crate::error::{Error, Result};

/// Low-level synthetic input backend.
///
/// The replay and click logic drives this trait instead of the OS directly,
/// so it can be exercised against a recording fake.
pub trait Injector: Send {
    fn key_down(&mut self, key: Key) -> Result<()>;
    fn key_up(&mut self, key: Key) -> Result<()>;
    /// Press and immediately release a key
    fn tap(&mut self, key: Key) -> Result<()>;
    fn move_pointer(&mut self, x: i32, y: i32) -> Result<()>;
    /// One left-button click at the current pointer position
    fn click(&mut self) -> Result<()>;
    fn pointer_location(&mut self) -> Result<(i32, i32)>;
}

/// [`Injector`] backed by a virtual keyboard and mouse
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| Error::Synthesis(format!("failed to initialize input backend: {e}")))?;
        Ok(Self { enigo })
    }
}

fn synthesis_err(e: enigo::InputError) -> Error {
    Error::Synthesis(e.to_string())
}

impl Injector for EnigoInjector {
    fn key_down(&mut self, key: Key) -> Result<()> {
        self.enigo.key(key, Direction::Press).map_err(synthesis_err)
    }

    fn key_up(&mut self, key: Key) -> Result<()> {
        self.enigo
            .key(key, Direction::Release)
            .map_err(synthesis_err)
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        self.enigo.key(key, Direction::Click).map_err(synthesis_err)
    }

    fn move_pointer(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(synthesis_err)
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(synthesis_err)
    }

    fn pointer_location(&mut self) -> Result<(i32, i32)> {
        self.enigo.location().map_err(synthesis_err)
    }
}

/// Replay a parsed hotkey combination.
///
/// Modifiers are pressed in the order ctrl, shift, alt and released in
/// reverse by a scoped guard, so an injection failure mid-sequence cannot
/// leave a modifier stuck. Key tokens the fixed table cannot resolve are
/// skipped.
pub fn replay<I: Injector + ?Sized>(injector: &mut I, spec: &HotkeySpec) -> Result<()> {
    let mut guard = ModifierGuard::new(injector);
    if spec.ctrl {
        guard.press(Key::Control)?;
    }
    if spec.shift {
        guard.press(Key::Shift)?;
    }
    if spec.alt {
        guard.press(Key::Alt)?;
    }
    for token in &spec.keys {
        match resolve_key(token) {
            Some(key) => guard.tap(key)?,
            None => debug!("skipping unresolvable key token: {token:?}"),
        }
    }
    Ok(())
}

/// Move the pointer to a screen position and left-click it
pub fn click_at<I: Injector + ?Sized>(injector: &mut I, x: i32, y: i32) -> Result<()> {
    injector.move_pointer(x, y)?;
    injector.click()
}

/// Read the pointer position, formatted as "x,y"
pub fn pointer_position<I: Injector + ?Sized>(injector: &mut I) -> Result<String> {
    let (x, y) = injector.pointer_location()?;
    Ok(format!("{x},{y}"))
}

/// Holds pressed modifiers and releases them in reverse order on drop
struct ModifierGuard<'a, I: Injector + ?Sized> {
    injector: &'a mut I,
    held: Vec<Key>,
}

impl<'a, I: Injector + ?Sized> ModifierGuard<'a, I> {
    fn new(injector: &'a mut I) -> Self {
        Self {
            injector,
            held: Vec::new(),
        }
    }

    fn press(&mut self, key: Key) -> Result<()> {
        self.injector.key_down(key)?;
        self.held.push(key);
        Ok(())
    }

    fn tap(&mut self, key: Key) -> Result<()> {
        self.injector.tap(key)
    }
}

impl<I: Injector + ?Sized> Drop for ModifierGuard<'_, I> {
    fn drop(&mut self) {
        while let Some(key) = self.held.pop() {
            if let Err(e) = self.injector.key_up(key) {
                warn!("failed to release modifier {key:?}: {e}");
            }
        }
    }
}

/// Resolve a hotkey-spec token: a single character maps to its unicode key,
/// multi-character tokens go through the fixed symbolic table
fn resolve_key(token: &str) -> Option<Key> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Unicode(c));
    }
    let key = match token {
        "enter" | "return" => Key::Return,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every injector call; optionally fails all taps
    #[derive(Default)]
    struct RecordingInjector {
        calls: Vec<String>,
        fail_taps: bool,
    }

    impl Injector for RecordingInjector {
        fn key_down(&mut self, key: Key) -> Result<()> {
            self.calls.push(format!("down {key:?}"));
            Ok(())
        }

        fn key_up(&mut self, key: Key) -> Result<()> {
            self.calls.push(format!("up {key:?}"));
            Ok(())
        }

        fn tap(&mut self, key: Key) -> Result<()> {
            if self.fail_taps {
                return Err(Error::Synthesis("tap failed".into()));
            }
            self.calls.push(format!("tap {key:?}"));
            Ok(())
        }

        fn move_pointer(&mut self, x: i32, y: i32) -> Result<()> {
            self.calls.push(format!("move {x},{y}"));
            Ok(())
        }

        fn click(&mut self) -> Result<()> {
            self.calls.push("click".into());
            Ok(())
        }

        fn pointer_location(&mut self) -> Result<(i32, i32)> {
            Ok((640, 480))
        }
    }

    #[test]
    fn test_replay_ctrl_combination() {
        let mut injector = RecordingInjector::default();
        replay(&mut injector, &HotkeySpec::parse("ctrl+c")).unwrap();
        assert_eq!(
            injector.calls,
            vec!["down Control", "tap Unicode('c')", "up Control"]
        );
    }

    #[test]
    fn test_modifier_ordering() {
        let mut injector = RecordingInjector::default();
        replay(&mut injector, &HotkeySpec::parse("ctrl+shift+alt+a")).unwrap();
        assert_eq!(
            injector.calls,
            vec![
                "down Control",
                "down Shift",
                "down Alt",
                "tap Unicode('a')",
                "up Alt",
                "up Shift",
                "up Control",
            ]
        );
    }

    #[test]
    fn test_modifiers_released_on_failure() {
        let mut injector = RecordingInjector {
            fail_taps: true,
            ..Default::default()
        };
        assert!(replay(&mut injector, &HotkeySpec::parse("ctrl+shift+x")).is_err());
        // The guard still released both modifiers, in reverse order
        assert_eq!(
            injector.calls,
            vec!["down Control", "down Shift", "up Shift", "up Control"]
        );
    }

    #[test]
    fn test_symbolic_tokens_replay() {
        let mut injector = RecordingInjector::default();
        replay(&mut injector, &HotkeySpec::parse("ctrl+enter")).unwrap();
        assert_eq!(
            injector.calls,
            vec!["down Control", "tap Return", "up Control"]
        );
    }

    #[test]
    fn test_unresolvable_tokens_are_skipped() {
        let mut injector = RecordingInjector::default();
        replay(&mut injector, &HotkeySpec::parse("ctrl+bogus+c")).unwrap();
        assert_eq!(
            injector.calls,
            vec!["down Control", "tap Unicode('c')", "up Control"]
        );
    }

    #[test]
    fn test_click_at() {
        let mut injector = RecordingInjector::default();
        click_at(&mut injector, 100, 200).unwrap();
        assert_eq!(injector.calls, vec!["move 100,200", "click"]);
    }

    #[test]
    fn test_pointer_position_format() {
        let mut injector = RecordingInjector::default();
        assert_eq!(pointer_position(&mut injector).unwrap(), "640,480");
    }

    #[test]
    fn test_resolve_key_table() {
        assert_eq!(resolve_key("a"), Some(Key::Unicode('a')));
        assert_eq!(resolve_key("pageup"), Some(Key::PageUp));
        assert_eq!(resolve_key("f12"), Some(Key::F12));
        assert_eq!(resolve_key("bogus"), None);
    }
}
