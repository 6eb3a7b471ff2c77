//! Application layer for the device.
//!
//! - **`ports`** – The traits the session drives: transport connector and
//!   handle, microphone source and capture stream, haptics, notifier.
//!   Infrastructure provides the implementations.
//!
//! - **`outbound`** – The bounded frame queue between the session and the
//!   transport writer, with the drop-oldest-audio policy.
//!
//! - **`emitters`** – Stateless mapping from discrete UI actions to commands.
//!
//! - **`audio_session`** – One microphone capture, sliced into chunks.
//!
//! - **`session`** – The [`session::RemoteSession`] aggregate: connection
//!   state machine plus everything it owns.
//!
//! - **`event_loop`** – The single task that feeds UI actions, transport
//!   events and audio ticks into the session.

pub mod audio_session;
pub mod emitters;
pub mod event_loop;
pub mod outbound;
pub mod ports;
pub mod session;
