//! relay-host library crate.
//!
//! A minimal desktop host for the remote input relay.  It accepts WebSocket
//! connections from devices, checks the PIN in the upgrade request, decodes
//! each text frame into a [`relay_core::RelayCommand`] and hands it to an
//! [`application::InputSink`].
//!
//! # Architecture
//!
//! ```text
//! Device (JSON over WebSocket)
//!         ↓
//! [relay-host]
//!   ├── domain/           HostConfig, PIN generation and check
//!   ├── application/      InputSink port, frame dispatch
//!   └── infrastructure/
//!         ├── ws_server   accept loop (tokio-tungstenite)
//!         └── *_sink      logging and recording sinks
//! ```

/// Domain layer: configuration and PIN handling (no I/O).
pub mod domain;

/// Application layer: the input sink port and frame dispatch.
pub mod application;

/// Infrastructure layer: WebSocket server and sinks.
pub mod infrastructure;
