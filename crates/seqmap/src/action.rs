use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hotkey-table value that requests a cursor-position report instead of a
/// keystroke replay.
pub const CURSOR_REPORT_SENTINEL: &str = "GET_MOUSE_POSITION";

/// A parsed hotkey combination like "ctrl+shift+a".
///
/// Modifiers may appear anywhere in the spec string; everything else is kept
/// as an ordered key token. Tokens that the synthesizer cannot resolve are
/// skipped at replay time, so parsing itself never rejects a token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HotkeySpec {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Non-modifier key tokens, replayed in order
    pub keys: Vec<String>,
}

impl HotkeySpec {
    /// Parse a "+"-separated hotkey string, e.g. "ctrl+shift+a" or "alt+f4"
    pub fn parse(s: &str) -> Self {
        let mut spec = Self::default();
        for part in s.split('+') {
            let part = part.trim().to_lowercase();
            match part.as_str() {
                "" => {}
                "ctrl" | "control" => spec.ctrl = true,
                "shift" => spec.shift = true,
                "alt" => spec.alt = true,
                _ => spec.keys.push(part),
            }
        }
        spec
    }
}

impl FromStr for HotkeySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::new();
        if self.ctrl {
            parts.push("ctrl");
        }
        if self.shift {
            parts.push("shift");
        }
        if self.alt {
            parts.push("alt");
        }
        for key in &self.keys {
            parts.push(key.as_str());
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Parse an "x,y" screen position literal into pixel coordinates
pub fn parse_position(s: &str) -> Result<(i32, i32)> {
    let mut parts = s.split(',');
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::Format(format!("expected \"x,y\", got {s:?}")));
    };
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Format(format!("invalid x coordinate in {s:?}")))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Format(format!("invalid y coordinate in {s:?}")))?;
    Ok((x, y))
}

/// The effect executed when a typed sequence matches a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replay a modifier+key combination
    Replay(HotkeySpec),
    /// Move the pointer to a screen position and left-click it
    Click { x: i32, y: i32 },
    /// Copy the current pointer position to the clipboard
    CursorReport,
}

impl Action {
    /// Interpret a hotkey-table value
    pub fn from_hotkey_value(value: &str) -> Self {
        if value == CURSOR_REPORT_SENTINEL {
            Self::CursorReport
        } else {
            Self::Replay(HotkeySpec::parse(value))
        }
    }

    /// Interpret a mouse-table value
    pub fn from_mouse_value(value: &str) -> Result<Self> {
        let (x, y) = parse_position(value)?;
        Ok(Self::Click { x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_specs() {
        let spec = HotkeySpec::parse("ctrl+c");
        assert!(spec.ctrl && !spec.shift && !spec.alt);
        assert_eq!(spec.keys, vec!["c"]);

        let spec = HotkeySpec::parse("f5");
        assert!(!spec.ctrl && !spec.shift && !spec.alt);
        assert_eq!(spec.keys, vec!["f5"]);
    }

    #[test]
    fn test_parse_multiple_modifiers_and_keys() {
        let spec = HotkeySpec::parse("ctrl+shift+alt+a+b");
        assert!(spec.ctrl && spec.shift && spec.alt);
        assert_eq!(spec.keys, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_alternative_names_and_case() {
        let spec = HotkeySpec::parse("Control+A");
        assert!(spec.ctrl);
        assert_eq!(spec.keys, vec!["a"]);

        // Whitespace around parts is tolerated
        let spec = HotkeySpec::parse(" ctrl + enter ");
        assert!(spec.ctrl);
        assert_eq!(spec.keys, vec!["enter"]);
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["ctrl+c", "ctrl+shift+a", "alt+f4", "ctrl+shift+alt+enter"] {
            let spec = HotkeySpec::parse(s);
            assert_eq!(spec.to_string(), s);
            assert_eq!(HotkeySpec::parse(&spec.to_string()), spec);
        }
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("100,200").unwrap(), (100, 200));
        assert_eq!(parse_position(" -5 , 42 ").unwrap(), (-5, 42));
    }

    #[test]
    fn test_parse_position_errors() {
        assert!(matches!(parse_position("abc"), Err(Error::Format(_))));
        assert!(matches!(parse_position("1,2,3"), Err(Error::Format(_))));
        assert!(matches!(parse_position("1"), Err(Error::Format(_))));
        assert!(matches!(parse_position("x,y"), Err(Error::Format(_))));
        assert!(matches!(parse_position(""), Err(Error::Format(_))));
    }

    #[test]
    fn test_action_from_values() {
        assert_eq!(
            Action::from_hotkey_value(CURSOR_REPORT_SENTINEL),
            Action::CursorReport
        );
        assert!(matches!(
            Action::from_hotkey_value("ctrl+v"),
            Action::Replay(_)
        ));
        assert_eq!(
            Action::from_mouse_value("10,20").unwrap(),
            Action::Click { x: 10, y: 20 }
        );
        assert!(Action::from_mouse_value("nope").is_err());
    }
}
