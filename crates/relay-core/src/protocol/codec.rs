//! JSON codec for relay command frames.
//!
//! Wire format: exactly one JSON object per WebSocket text frame, UTF-8,
//! discriminated by its `"type"` field (see [`RelayCommand`]).  There is no
//! batching, no compression and no delimiter handling beyond the transport's
//! own framing.
//!
//! The device side only ever calls [`encode_command`]; the codec never waits
//! for or inspects a reply.  The host side calls [`decode_frame`] and must
//! discard a frame that fails with [`ProtocolError::MalformedFrame`] without
//! dropping the connection.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::protocol::commands::RelayCommand;

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is not a valid relay command.
    ///
    /// Covers invalid JSON, an unknown `type`, missing or mistyped fields,
    /// and values outside the schema (scroll delta other than ±1, empty text,
    /// audio data that is not base64).
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The command could not be serialized.
    #[error("failed to encode command: {0}")]
    Encode(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`RelayCommand`] into one text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.  With the
/// current schema this cannot happen in practice; the `Result` keeps the
/// signature honest for callers.
///
/// # Examples
///
/// ```rust
/// use relay_core::{encode_command, RelayCommand, ScrollDirection};
///
/// let frame = encode_command(&RelayCommand::MouseScroll {
///     direction: ScrollDirection::Up,
/// })
/// .unwrap();
/// assert_eq!(frame, r#"{"type":"mouse_scroll","delta":1}"#);
/// ```
pub fn encode_command(cmd: &RelayCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(cmd).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes one text frame into a [`RelayCommand`].
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedFrame`] if the frame is not valid JSON,
/// does not match the schema, or carries values outside it.
///
/// # Examples
///
/// ```rust
/// use relay_core::{decode_frame, RelayCommand};
///
/// let cmd = decode_frame(r#"{"type":"mouse_move","dx":3,"dy":-1}"#).unwrap();
/// assert_eq!(cmd, RelayCommand::MouseMove { dx: 3, dy: -1 });
/// assert!(decode_frame("not json").is_err());
/// ```
pub fn decode_frame(frame: &str) -> Result<RelayCommand, ProtocolError> {
    let cmd: RelayCommand =
        serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;
    validate(&cmd)?;
    Ok(cmd)
}

/// Decodes the base64 payload of an `audio_stream` frame into raw bytes.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedFrame`] if `data` is not standard,
/// padded base64.
pub fn decode_audio_payload(data: &str) -> Result<Vec<u8>, ProtocolError> {
    STANDARD
        .decode(data)
        .map_err(|e| ProtocolError::MalformedFrame(format!("audio data is not base64: {e}")))
}

// ── Schema validation ─────────────────────────────────────────────────────────

/// Checks the value constraints serde cannot express.
fn validate(cmd: &RelayCommand) -> Result<(), ProtocolError> {
    match cmd {
        RelayCommand::TextType { text } if text.is_empty() => Err(ProtocolError::MalformedFrame(
            "text_type with empty text".to_string(),
        )),
        RelayCommand::AudioChunk { data } => {
            if data.is_empty() {
                return Err(ProtocolError::MalformedFrame(
                    "audio_stream with empty data".to_string(),
                ));
            }
            decode_audio_payload(data).map(|_| ())
        }
        _ => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::{MouseButton, ScrollDirection};
    use crate::protocol::keys::KeyName;

    fn roundtrip(cmd: RelayCommand) -> RelayCommand {
        let frame = encode_command(&cmd).expect("encode must succeed");
        decode_frame(&frame).expect("decode must succeed")
    }

    // ── Encoding shape ────────────────────────────────────────────────────────

    #[test]
    fn test_encode_scroll_up_exact_frame() {
        let frame = encode_command(&RelayCommand::MouseScroll {
            direction: ScrollDirection::Up,
        })
        .unwrap();
        assert_eq!(frame, r#"{"type":"mouse_scroll","delta":1}"#);
    }

    #[test]
    fn test_encode_scroll_down_exact_frame() {
        let frame = encode_command(&RelayCommand::MouseScroll {
            direction: ScrollDirection::Down,
        })
        .unwrap();
        assert_eq!(frame, r#"{"type":"mouse_scroll","delta":-1}"#);
    }

    #[test]
    fn test_encode_key_press_exact_frame() {
        let frame = encode_command(&RelayCommand::KeyPress {
            key: KeyName::Backspace,
        })
        .unwrap();
        assert_eq!(frame, r#"{"type":"key_press","key":"backspace"}"#);
    }

    #[test]
    fn test_encode_produces_single_line() {
        // One command → one frame; the JSON must not be pretty-printed.
        let frame = encode_command(&RelayCommand::TextType {
            text: "hello world".to_string(),
        })
        .unwrap();
        assert!(!frame.contains('\n'));
    }

    // ── Round trips ───────────────────────────────────────────────────────────

    #[test]
    fn test_mouse_move_round_trips_with_negative_deltas() {
        let original = RelayCommand::MouseMove { dx: -120, dy: 37 };
        assert_eq!(roundtrip(original.clone()), original);
    }

    #[test]
    fn test_text_with_unicode_and_quotes_round_trips() {
        let original = RelayCommand::TextType {
            text: "Hola \"mundo\" ñ ✓\n".to_string(),
        };
        assert_eq!(roundtrip(original.clone()), original);
    }

    #[test]
    fn test_audio_chunk_round_trips() {
        let original = RelayCommand::AudioChunk {
            data: STANDARD.encode([0u8, 1, 2, 3, 254, 255]),
        };
        assert_eq!(roundtrip(original.clone()), original);
    }

    // ── Decoding from host-side JSON ──────────────────────────────────────────

    #[test]
    fn test_decode_accepts_reordered_fields_and_whitespace() {
        let cmd = decode_frame(r#" { "dy": 5, "type": "mouse_move", "dx": -5 } "#).unwrap();
        assert_eq!(cmd, RelayCommand::MouseMove { dx: -5, dy: 5 });
    }

    #[test]
    fn test_decode_click() {
        let cmd = decode_frame(r#"{"type":"mouse_click","button":"left"}"#).unwrap();
        assert_eq!(
            cmd,
            RelayCommand::MouseClick {
                button: MouseButton::Left
            }
        );
    }

    // ── Malformed frames ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            decode_frame("{not json"),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        assert!(matches!(
            decode_frame(r#"{"type":"mouse_drag","dx":1}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        assert!(matches!(
            decode_frame(r#"{"dx":1,"dy":2}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        assert!(matches!(
            decode_frame(r#"{"type":"mouse_move","dx":1}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_mistyped_field() {
        assert!(matches!(
            decode_frame(r#"{"type":"mouse_move","dx":"1","dy":2}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_scroll_magnitude() {
        assert!(matches!(
            decode_frame(r#"{"type":"mouse_scroll","delta":3}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"type":"mouse_scroll","delta":0}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_text() {
        assert!(matches!(
            decode_frame(r#"{"type":"text_type","text":""}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_button_and_key() {
        assert!(decode_frame(r#"{"type":"mouse_click","button":"middle"}"#).is_err());
        assert!(decode_frame(r#"{"type":"key_press","key":"f13"}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_non_base64_audio() {
        assert!(matches!(
            decode_frame(r#"{"type":"audio_stream","data":"@@@"}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_rejects_empty_audio() {
        assert!(decode_frame(r#"{"type":"audio_stream","data":""}"#).is_err());
    }

    #[test]
    fn test_decode_audio_payload_returns_bytes() {
        let bytes = decode_audio_payload("AAEC").unwrap();
        assert_eq!(bytes, vec![0, 1, 2]);
    }
}
