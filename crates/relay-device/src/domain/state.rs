//! Session state, transport lifecycle events and user notifications.

use std::fmt;

/// Connection state of a [`crate::application::session::RemoteSession`].
///
/// Owned solely by the session; every other component only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No transport exists.
    #[default]
    Disconnected,
    /// A transport was opened and the handshake has not finished yet.
    Connecting,
    /// The WebSocket is open; commands flow.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(s)
    }
}

// ── Transport lifecycle ───────────────────────────────────────────────────────

/// What happened to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The handshake completed.
    Opened,
    /// The peer closed the connection, or the stream ended.
    Closed,
    /// Connecting or reading failed.
    Error(String),
}

/// A lifecycle event tagged with the connect attempt that produced it.
///
/// The session ignores events whose `attempt` is not the current one, so a
/// late `Closed` from an abandoned transport never reaches the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub attempt: u64,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn opened(attempt: u64) -> Self {
        Self {
            attempt,
            kind: TransportEventKind::Opened,
        }
    }

    pub fn closed(attempt: u64) -> Self {
        Self {
            attempt,
            kind: TransportEventKind::Closed,
        }
    }

    pub fn error(attempt: u64, reason: impl Into<String>) -> Self {
        Self {
            attempt,
            kind: TransportEventKind::Error(reason.into()),
        }
    }
}

// ── Notifications ─────────────────────────────────────────────────────────────

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
}

/// Every user-visible outcome the session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Connected,
    ConnectionFailed,
    ConnectionLost,
    Disconnected,
    InvalidAddress,
    ConnectRejected,
    MicrophoneOn,
    MicrophoneOff,
    MicrophoneUnavailable,
    TextSent,
    ScanFailed,
}

impl NotificationKind {
    /// The severity this kind is always reported with.
    pub fn severity(self) -> Severity {
        match self {
            NotificationKind::Connected
            | NotificationKind::Disconnected
            | NotificationKind::MicrophoneOn
            | NotificationKind::MicrophoneOff
            | NotificationKind::TextSent => Severity::Info,
            NotificationKind::ConnectionFailed
            | NotificationKind::ConnectionLost
            | NotificationKind::InvalidAddress
            | NotificationKind::ConnectRejected
            | NotificationKind::MicrophoneUnavailable
            | NotificationKind::ScanFailed => Severity::Error,
        }
    }
}

/// A one-shot message for the user (a toast in a graphical front end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    /// Builds a notification with the kind's fixed severity.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
