//! The fixed key vocabulary of [`RelayCommand::KeyPress`](crate::RelayCommand::KeyPress).
//!
//! The device only offers a handful of quick keys (arbitrary keys are out of
//! scope; free text goes through `text_type`).  On the wire each key is its
//! lowercase name.

use serde::{Deserialize, Serialize};

/// A symbolic key name from the fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyName {
    Enter,
    Backspace,
    Esc,
    Tab,
    Space,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl KeyName {
    /// Every key in the vocabulary, in display order.
    pub const ALL: [KeyName; 12] = [
        KeyName::Enter,
        KeyName::Backspace,
        KeyName::Esc,
        KeyName::Tab,
        KeyName::Space,
        KeyName::Delete,
        KeyName::Up,
        KeyName::Down,
        KeyName::Left,
        KeyName::Right,
        KeyName::Home,
        KeyName::End,
    ];

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyName::Enter => "enter",
            KeyName::Backspace => "backspace",
            KeyName::Esc => "esc",
            KeyName::Tab => "tab",
            KeyName::Space => "space",
            KeyName::Delete => "delete",
            KeyName::Up => "up",
            KeyName::Down => "down",
            KeyName::Left => "left",
            KeyName::Right => "right",
            KeyName::Home => "home",
            KeyName::End => "end",
        }
    }
}

impl std::fmt::Display for KeyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyName {
    type Err = String;

    /// Parses a key name case-insensitively.  `escape` is accepted as an
    /// alias of `esc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "escape" {
            return Ok(KeyName::Esc);
        }
        KeyName::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| format!("unknown key: {lower}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
