//! Domain types for the device: the persisted configuration and the value
//! types the session state machine reports (state, lifecycle events,
//! notifications).

pub mod config;
pub mod state;

pub use config::{ConfigError, DeviceConfig};
pub use state::{
    ConnectionState, Notification, NotificationKind, Severity, TransportEvent, TransportEventKind,
};
