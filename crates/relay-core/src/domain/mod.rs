//! Domain module: pure business logic with no I/O.
//!
//! - [`endpoint`] – the `(host, port, pin)` connection target and its URL form.
//! - [`gesture`] – touch positions to relative mouse motion.
//! - [`audio`] – capture configuration and chunk payload encoding.

pub mod audio;
pub mod endpoint;
pub mod gesture;

pub use audio::{encode_chunk, f32_to_pcm16, CaptureConfig};
pub use endpoint::{ConnectionEndpoint, EndpointError, RelayScheme};
pub use gesture::GestureTranslator;
