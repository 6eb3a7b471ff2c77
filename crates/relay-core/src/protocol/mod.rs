//! Protocol module containing the command schema, key vocabulary and JSON codec.

pub mod codec;
pub mod commands;
pub mod keys;

pub use codec::{decode_audio_payload, decode_frame, encode_command, ProtocolError};
pub use commands::*;
pub use keys::KeyName;
