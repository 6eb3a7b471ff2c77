//! Ports: the traits the session aggregate depends on.
//!
//! Each trait has a production implementation in `infrastructure` and a
//! recording test double, so the whole state machine can be exercised
//! without sockets or audio hardware.

use std::time::Duration;

use relay_core::{CaptureConfig, ConnectionEndpoint};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::state::{Notification, TransportEvent};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors raised by the transport and the outbound queue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The outbound queue is full of control frames.
    #[error("outbound queue is full")]
    QueueFull,

    /// The transport has been closed.
    #[error("transport is closed")]
    Closed,

    /// A `wss://` endpoint was requested but TLS support is not compiled in.
    #[error("secure websocket (wss) support is not enabled in this build")]
    TlsUnavailable,

    /// No async runtime is available to run the connection task.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),
}

/// Errors raised while acquiring or running the microphone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No usable input device, or permission was denied.
    #[error("microphone unavailable: {0}")]
    Unavailable(String),

    /// The device cannot deliver a format the relay can encode.
    #[error("unsupported capture format: {0}")]
    UnsupportedFormat(String),
}

/// A haptic actuator failure.  Callers ignore it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("haptic feedback failed: {0}")]
pub struct HapticError(pub String);

// ── Outbound frames ───────────────────────────────────────────────────────────

/// Whether a frame may be sacrificed under backpressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Input commands.  Never dropped in favour of audio.
    Control,
    /// Audio chunks.  The oldest is dropped first when the queue is full.
    Audio,
}

/// One encoded frame waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub kind: FrameKind,
    pub text: String,
}

impl OutboundFrame {
    pub fn control(text: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Control,
            text: text.into(),
        }
    }

    pub fn audio(text: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Audio,
            text: text.into(),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == FrameKind::Audio
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Opens transports.  One call per connect attempt.
pub trait TransportConnector: Send {
    /// Starts connecting to `endpoint` and returns immediately.
    ///
    /// The outcome arrives later on `events`, tagged with `attempt`:
    /// `Opened` once the handshake completes, then `Closed` or `Error` when
    /// the connection ends.  Nothing is reported after [`TransportHandle::close`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the attempt cannot even be started.
    fn open(
        &mut self,
        endpoint: &ConnectionEndpoint,
        attempt: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn TransportHandle>, TransportError>;
}

/// One live connection, exclusively owned by the session.
pub trait TransportHandle: Send {
    /// Queues a frame for writing.  Never blocks.
    ///
    /// # Errors
    ///
    /// [`TransportError::QueueFull`] when no room can be made,
    /// [`TransportError::Closed`] after [`close`](Self::close).
    fn send(&self, frame: OutboundFrame) -> Result<(), TransportError>;

    /// Removes every audio frame that has not been written yet.  Returns how
    /// many were removed.
    fn discard_pending_audio(&self) -> usize;

    /// Closes the connection.  Idempotent.
    fn close(&mut self);
}

// ── Microphone ────────────────────────────────────────────────────────────────

/// Acquires microphone capture streams.
pub trait MicrophoneSource: Send {
    /// Starts capturing with `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError`] when no device is available or permission is
    /// denied.
    fn open(&mut self, config: &CaptureConfig) -> Result<Box<dyn CaptureStream>, AudioError>;
}

/// A running capture.  Samples accumulate until taken.
pub trait CaptureStream: Send {
    /// Drains and returns every PCM16 sample captured since the last call.
    fn take_samples(&mut self) -> Vec<i16>;

    /// Stops the device and releases it.  Idempotent.
    fn stop(&mut self);
}

// ── Feedback ──────────────────────────────────────────────────────────────────

/// Short vibration on taps.
#[cfg_attr(test, mockall::automock)]
pub trait HapticFeedback: Send {
    /// Vibrates for `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`HapticError`] when the actuator is missing or busy.
    fn pulse(&self, duration: Duration) -> Result<(), HapticError>;
}

/// Presents [`Notification`]s to the user.
pub trait Notifier: Send {
    fn notify(&self, notification: Notification);
}
