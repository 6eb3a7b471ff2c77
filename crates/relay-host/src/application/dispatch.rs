//! Frame dispatch: one text frame in, one [`InputSink`] call out.
//!
//! Pure apart from the sink call, so the accept loop stays a thin I/O shell.

use relay_core::{decode_audio_payload, decode_frame, ProtocolError, RelayCommand};
use thiserror::Error;

use crate::application::input_sink::{InputSink, SinkError};

/// Errors from handling one frame.  Neither ends the connection.
#[derive(Debug, Error)]
pub enum HostError {
    /// The frame is not a valid relay command.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] ProtocolError),

    /// The sink refused the command.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Decodes `frame` and forwards it to `sink`.
///
/// Returns the command's wire type name for logging.
///
/// # Errors
///
/// [`HostError::MalformedFrame`] when decoding fails (the sink is not
/// called); [`HostError::Sink`] when the sink fails.
pub fn dispatch_frame(sink: &dyn InputSink, frame: &str) -> Result<&'static str, HostError> {
    let command = decode_frame(frame)?;
    let name = command.type_name();

    match command {
        RelayCommand::MouseMove { dx, dy } => sink.move_pointer(dx, dy)?,
        RelayCommand::MouseClick { button } => sink.click(button)?,
        RelayCommand::MouseScroll { direction } => sink.scroll(direction)?,
        RelayCommand::KeyPress { key } => sink.press_key(key)?,
        RelayCommand::TextType { text } => sink.type_text(&text)?,
        RelayCommand::AudioChunk { data } => {
            let pcm = decode_audio_payload(&data)?;
            sink.audio_chunk(&pcm)?;
        }
    }

    Ok(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
