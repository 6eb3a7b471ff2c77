//! Connection endpoint: the `(host, port, pin)` triple that identifies and
//! authorizes a connection target.
//!
//! An endpoint comes from one of two places:
//!
//! - **Manual entry** – three text fields typed by the user.  Manual entry
//!   always uses the insecure `ws` scheme.
//! - **A connection URL** – usually the decoded payload of the QR code the
//!   host displays, in the form `ws://host:port?pin=XXXX` (or `wss://`).
//!
//! Both paths are validated here, before any network attempt.  Every failure
//! is an [`EndpointError`], which the device surfaces as an "invalid address
//! format" error.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Maximum PIN length accepted from the manual entry form.
pub const MANUAL_PIN_MAX_LEN: usize = 4;

/// Errors produced while building a [`ConnectionEndpoint`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// A manual entry field was empty.
    #[error("the {0} field is required")]
    MissingField(&'static str),

    /// The URL does not start with `ws://` or `wss://`.
    #[error("unsupported connection URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The URL (or the URL synthesized from manual fields) does not parse.
    #[error("invalid connection URL: {0}")]
    InvalidUrl(String),

    /// The port is missing, zero, or not a number.
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// The URL carries no `pin` query parameter (or an empty one).
    #[error("connection URL has no pin")]
    MissingPin,

    /// The manually entered PIN is longer than the entry form allows.
    #[error("pin must be at most {MANUAL_PIN_MAX_LEN} characters")]
    PinTooLong,
}

/// Transport scheme of a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayScheme {
    /// Plain `ws://`.
    Insecure,
    /// TLS `wss://`.
    Secure,
}

impl RelayScheme {
    /// The URL scheme string.
    pub fn as_str(self) -> &'static str {
        match self {
            RelayScheme::Insecure => "ws",
            RelayScheme::Secure => "wss",
        }
    }

    /// Detects the scheme from the start of `url`, ignoring ASCII case.
    ///
    /// Returns `None` for anything other than `ws://` or `wss://`.
    pub fn detect(url: &str) -> Option<Self> {
        let lower = url.get(..6).unwrap_or(url).to_ascii_lowercase();
        if lower.starts_with("wss://") {
            Some(RelayScheme::Secure)
        } else if lower.starts_with("ws://") {
            Some(RelayScheme::Insecure)
        } else {
            None
        }
    }
}

/// A validated connection target.
///
/// `Debug` and `Display` never print the PIN.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    scheme: RelayScheme,
    host: String,
    port: u16,
    pin: String,
}

impl ConnectionEndpoint {
    /// Builds an endpoint from the three manual entry fields.
    ///
    /// Fields are trimmed; all three must be non-empty.  The port must be a
    /// non-zero number and the PIN at most [`MANUAL_PIN_MAX_LEN`] characters.
    ///
    /// # Errors
    ///
    /// Returns an [`EndpointError`] describing the first invalid field.
    ///
    /// # Example
    ///
    /// ```rust
    /// use relay_core::ConnectionEndpoint;
    ///
    /// let ep = ConnectionEndpoint::from_manual("192.168.0.12", "8765", "9988").unwrap();
    /// assert_eq!(ep.to_url(), "ws://192.168.0.12:8765?pin=9988");
    /// ```
    pub fn from_manual(host: &str, port: &str, pin: &str) -> Result<Self, EndpointError> {
        let host = host.trim();
        let port = port.trim();
        let pin = pin.trim();

        if host.is_empty() {
            return Err(EndpointError::MissingField("host"));
        }
        if port.is_empty() {
            return Err(EndpointError::MissingField("port"));
        }
        if pin.is_empty() {
            return Err(EndpointError::MissingField("pin"));
        }
        if pin.chars().count() > MANUAL_PIN_MAX_LEN {
            return Err(EndpointError::PinTooLong);
        }

        let port: u16 = match port.parse() {
            Ok(p) if p != 0 => p,
            _ => return Err(EndpointError::InvalidPort(port.to_string())),
        };

        // An IPv6 literal typed without brackets still needs them in a URL.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        let endpoint = Self {
            scheme: RelayScheme::Insecure,
            host,
            port,
            pin: pin.to_string(),
        };

        // Let the URL parser reject hosts that cannot appear in a URL
        // (spaces, slashes, ...).
        Url::parse(&endpoint.to_url()).map_err(|e| EndpointError::InvalidUrl(e.to_string()))?;

        Ok(endpoint)
    }

    /// Parses a connection URL such as a scanned QR payload.
    ///
    /// The input is trimmed.  The scheme check is case-insensitive and happens
    /// before anything else, so `http://x` fails with
    /// [`EndpointError::UnsupportedScheme`].
    ///
    /// # Errors
    ///
    /// Returns an [`EndpointError`] if the scheme is wrong, the URL does not
    /// parse, or the host, port or pin is missing.
    pub fn parse_url(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();

        let scheme = RelayScheme::detect(raw).ok_or_else(|| {
            // Only echo a short prefix of whatever was scanned.
            let snippet: String = raw.chars().take(15).collect();
            EndpointError::UnsupportedScheme(snippet)
        })?;

        let url = Url::parse(raw).map_err(|e| EndpointError::InvalidUrl(e.to_string()))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EndpointError::InvalidUrl("missing host".to_string()))?
            .to_string();

        let port = url
            .port_or_known_default()
            .filter(|p| *p != 0)
            .ok_or_else(|| EndpointError::InvalidPort("missing".to_string()))?;

        let pin = url
            .query_pairs()
            .find(|(k, _)| k == "pin")
            .map(|(_, v)| v.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or(EndpointError::MissingPin)?;

        Ok(Self {
            scheme,
            host,
            port,
            pin,
        })
    }

    /// The transport scheme.
    pub fn scheme(&self) -> RelayScheme {
        self.scheme
    }

    /// Host name or IP literal (IPv6 literals keep their brackets).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The session PIN.
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Formats the canonical connection URL, `scheme://host:port?pin=pin`.
    ///
    /// The PIN is form-urlencoded; a plain numeric PIN appears unchanged.
    pub fn to_url(&self) -> String {
        let pin: String = url::form_urlencoded::byte_serialize(self.pin.as_bytes()).collect();
        format!(
            "{}://{}:{}?pin={}",
            self.scheme.as_str(),
            self.host,
            self.port,
            pin
        )
    }

    /// Formats the URL the transport dials, `scheme://host:port/?pin=pin`.
    ///
    /// Same as [`Self::to_url`] with an explicit `/` path.  A WebSocket
    /// client writes the request target verbatim, and an empty path would
    /// produce a request line the server cannot parse.
    pub fn dial_url(&self) -> String {
        let pin: String = url::form_urlencoded::byte_serialize(self.pin.as_bytes()).collect();
        format!(
            "{}://{}:{}/?pin={}",
            self.scheme.as_str(),
            self.host,
            self.port,
            pin
        )
    }
}

impl fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
    }
}

impl fmt::Debug for ConnectionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionEndpoint")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pin", &"<redacted>")
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
