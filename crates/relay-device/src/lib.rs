//! relay-device library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does relay-device do?
//!
//! The *device* is the handheld side of the relay.  It turns touches, taps,
//! typed text and microphone audio into [`relay_core::RelayCommand`] frames
//! and pushes them to a desktop host over one WebSocket connection.
//!
//! 1. The user enters `host`, `port` and `pin`, or scans the host's QR code,
//!    which yields a `ws://host:port?pin=XXXX` URL.
//! 2. The [`application::session::RemoteSession`] validates the endpoint,
//!    opens a transport and tracks `Disconnected → Connecting → Connected`.
//! 3. While connected, touch samples go through the gesture translator,
//!    buttons and keys through the command emitters, and microphone samples
//!    through the audio relay session.
//! 4. Every command is encoded and placed on a bounded outbound queue that a
//!    single writer task drains onto the socket.
//!
//! Nothing travels back from the host except transport lifecycle events.

/// Domain layer: configuration schema and session state types.
pub mod domain;

/// Application layer: the session aggregate, ports, and the event loop.
pub mod application;

/// Infrastructure layer: WebSocket transport, microphone adapters, console.
pub mod infrastructure;
