//! Command emitters: discrete UI actions to commands.
//!
//! These are pure functions.  The session decides whether a command is sent
//! (only while connected) and fires the haptic pulse.

use relay_core::{KeyName, MouseButton, RelayCommand, ScrollDirection};

pub fn click(button: MouseButton) -> RelayCommand {
    RelayCommand::MouseClick { button }
}

pub fn scroll(direction: ScrollDirection) -> RelayCommand {
    RelayCommand::MouseScroll { direction }
}

pub fn key_press(key: KeyName) -> RelayCommand {
    RelayCommand::KeyPress { key }
}

/// Builds a `text_type` command from the input buffer.
///
/// Returns `None` when the buffer is empty or whitespace only.  The text is
/// sent exactly as typed; trimming is only used for the emptiness check.
pub fn text(buffer: &str) -> Option<RelayCommand> {
    if buffer.trim().is_empty() {
        return None;
    }
    Some(RelayCommand::TextType {
        text: buffer.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
