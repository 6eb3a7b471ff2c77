//! Infrastructure layer for the device.
//!
//! - **`transport`** – WebSocket connector and the recording test double.
//! - **`audio_capture`** – Microphone sources (hardware, tone, mock).
//! - **`feedback`** – Terminal haptics and notifier.
//! - **`console`** – stdin line parser standing in for the touch UI.

pub mod audio_capture;
pub mod console;
pub mod feedback;
pub mod transport;
