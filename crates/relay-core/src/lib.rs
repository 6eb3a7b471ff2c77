//! # relay-core
//!
//! Shared library for the remote input relay: the command schema sent from a
//! handheld device to a desktop host, the JSON codec that puts those commands
//! on the wire, and the pure translation logic that turns touch gestures and
//! microphone samples into commands.
//!
//! This crate is used by both the device and the host.  It has zero
//! dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview
//!
//! The device is a remote touchpad, keyboard and microphone for a desktop
//! machine.  Every user action becomes one self-contained [`RelayCommand`]
//! that travels as one WebSocket text frame.  Nothing ever travels back at the
//! application level.
//!
//! - **`protocol`** – The command enum, the fixed key vocabulary, and the JSON
//!   encode/decode functions.
//!
//! - **`domain`** – Pure logic with no I/O: connection endpoint parsing (the
//!   `ws://host:port?pin=XXXX` format that is also the QR payload), the gesture
//!   translator that converts absolute touch positions into relative mouse
//!   motion, and the audio chunk encoder.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::RelayCommand` instead of `relay_core::protocol::commands::RelayCommand`.
pub use domain::audio::{encode_chunk, f32_to_pcm16, CaptureConfig};
pub use domain::endpoint::{ConnectionEndpoint, EndpointError, RelayScheme};
pub use domain::gesture::GestureTranslator;
pub use protocol::codec::{decode_audio_payload, decode_frame, encode_command, ProtocolError};
pub use protocol::commands::{MouseButton, RelayCommand, ScrollDirection};
pub use protocol::keys::KeyName;
