//! Infrastructure layer for the host.
//!
//! - **`ws_server`** – Accept loop, PIN check at upgrade, frame reading.
//! - **`logging_sink`** – The default [`crate::application::InputSink`].
//! - **`recording_sink`** – Recording sink for tests.
//! - **`lan`** – Which address to advertise in the connection URL.

pub mod lan;
pub mod logging_sink;
pub mod recording_sink;
pub mod ws_server;

pub use logging_sink::LoggingInputSink;
pub use ws_server::{run_server, serve};
