//! Transport implementations.
//!
//! - [`ws::WsConnector`] – real WebSocket connections (tokio-tungstenite).
//! - [`mock::MockConnector`] – a recording stand-in for tests.

pub mod mock;
pub mod ws;

pub use ws::WsConnector;
