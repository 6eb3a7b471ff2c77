//! Host configuration.
//!
//! [`HostConfig`] is a plain struct built once at startup from CLI arguments
//! (see `main.rs`) and shared across session tasks behind an `Arc`.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use relay_core::{ConnectionEndpoint, EndpointError};

/// Default WebSocket port.
pub const DEFAULT_PORT: u16 = 8765;

/// All runtime configuration for the host.
///
/// # Example
///
/// ```rust
/// use relay_host::domain::HostConfig;
///
/// let cfg = HostConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8765);
/// ```
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: SocketAddr,

    /// Address devices should dial; goes into the connection URL.
    pub advertise_host: String,

    /// PIN a device must present in the `pin` query parameter.
    pub pin: String,

    /// How long one `accept()` may block before the shutdown flag is checked.
    pub accept_poll: Duration,
}

impl Default for HostConfig {
    /// | Field          | Default        |
    /// |----------------|----------------|
    /// | bind_addr      | `0.0.0.0:8765` |
    /// | advertise_host | `127.0.0.1`    |
    /// | pin            | `0000`         |
    /// | accept_poll    | 200 ms         |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            advertise_host: Ipv4Addr::LOCALHOST.to_string(),
            pin: "0000".to_string(),
            accept_poll: Duration::from_millis(200),
        }
    }
}

impl HostConfig {
    /// The endpoint a device should connect to.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the advertised host or the PIN would
    /// not pass device-side validation (e.g. a PIN longer than 4 characters).
    pub fn endpoint(&self) -> Result<ConnectionEndpoint, EndpointError> {
        ConnectionEndpoint::from_manual(
            &self.advertise_host,
            &self.bind_addr.port().to_string(),
            &self.pin,
        )
    }

    /// The connection URL / QR payload, `ws://host:port?pin=XXXX`.
    ///
    /// # Errors
    ///
    /// See [`HostConfig::endpoint`].
    pub fn connection_url(&self) -> Result<String, EndpointError> {
        self.endpoint().map(|e| e.to_url())
    }
}
