//! Domain layer for the host: configuration and PIN handling.  No I/O.

pub mod config;
pub mod pin;

pub use config::HostConfig;
