//! Application layer for the host.
//!
//! - **`input_sink`** – The [`input_sink::InputSink`] port that receives
//!   decoded input.
//! - **`dispatch`** – Decodes one frame and calls the sink.

pub mod dispatch;
pub mod input_sink;

pub use dispatch::{dispatch_frame, HostError};
pub use input_sink::{InputSink, SinkError};
