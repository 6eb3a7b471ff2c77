//! The seam between decoded relay commands and the desktop's input system.

use relay_core::{KeyName, MouseButton, ScrollDirection};
use thiserror::Error;

/// Error type for input injection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("platform error: {0}")]
    Platform(String),
}

/// Receives decoded input.
///
/// A real desktop host injects OS input here; the bundled
/// [`crate::infrastructure::LoggingInputSink`] only logs.
pub trait InputSink: Send + Sync {
    /// Moves the pointer by a relative amount.
    fn move_pointer(&self, dx: i32, dy: i32) -> Result<(), SinkError>;

    /// Presses and releases a mouse button.
    fn click(&self, button: MouseButton) -> Result<(), SinkError>;

    /// One wheel notch; positive is up.
    fn scroll(&self, direction: ScrollDirection) -> Result<(), SinkError>;

    /// Presses and releases a named key.
    fn press_key(&self, key: KeyName) -> Result<(), SinkError>;

    /// Types a string.
    fn type_text(&self, text: &str) -> Result<(), SinkError>;

    /// Plays or consumes one chunk of PCM16 little-endian mono audio.
    fn audio_chunk(&self, pcm: &[u8]) -> Result<(), SinkError>;
}
