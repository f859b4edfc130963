use rdev::Key;

/// One normalized key token.
///
/// The display form is the typed text verbatim for printable keys, or a
/// bracketed symbolic name like `[enter]` otherwise. The matching buffer
/// uses [`Token::canonical`], the lower-cased form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
}

impl Token {
    /// The form appended to the on-screen trail
    pub fn display(&self) -> &str {
        &self.text
    }

    /// The lower-cased form appended to the matching buffer
    pub fn canonical(&self) -> String {
        self.text.to_lowercase()
    }
}

/// Normalize one key press into a token.
///
/// `name` is the hook's unicode interpretation of the press, when it has
/// one. Printable text wins; anything else falls back to the key's symbolic
/// name. Keys with neither representation yield `None` and are skipped.
pub fn normalize(key: Key, name: Option<&str>) -> Option<Token> {
    if let Some(text) = name {
        if !text.trim().is_empty() && !text.chars().any(char::is_control) {
            return Some(Token { text: text.into() });
        }
    }
    symbolic_name(key).map(|name| Token {
        text: format!("[{name}]"),
    })
}

/// The bracketed-token alphabet for non-printable keys
pub fn symbolic_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Return | Key::KpReturn => "enter",
        Key::Escape => "esc",
        Key::Backspace => "backspace",
        Key::Delete | Key::KpDelete => "delete",
        Key::Insert => "insert",
        Key::Tab => "tab",
        Key::Space => "space",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "page_up",
        Key::PageDown => "page_down",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::ControlLeft => "ctrl_l",
        Key::ControlRight => "ctrl_r",
        Key::ShiftLeft => "shift_l",
        Key::ShiftRight => "shift_r",
        Key::Alt => "alt_l",
        Key::AltGr => "alt_gr",
        Key::MetaLeft => "cmd",
        Key::MetaRight => "cmd_r",
        Key::CapsLock => "caps_lock",
        Key::NumLock => "num_lock",
        Key::ScrollLock => "scroll_lock",
        Key::PrintScreen => "print_screen",
        Key::Pause => "pause",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        _ => return None,
    };
    Some(name)
}
