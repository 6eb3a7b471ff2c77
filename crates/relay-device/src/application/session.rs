//! RemoteSession: the single owned aggregate behind the device.
//!
//! The session holds the connection state, the gesture tracker, the live
//! transport handle and the audio relay session.  Every public method runs to
//! completion synchronously; the event loop in
//! [`crate::application::event_loop`] is the only caller in production.
//!
//! # State machine
//!
//! ```text
//!                connect()                 Opened
//! Disconnected ───────────▶ Connecting ───────────▶ Connected
//!      ▲                        │                       │
//!      │      Error / Closed    │   Error / Closed      │
//!      ├────────────────────────┘   disconnect()        │
//!      └────────────────────────────────────────────────┘
//! ```
//!
//! - At most one transport exists.  `connect()` while `Connecting` or
//!   `Connected` is rejected and the live attempt is left untouched.
//! - Each attempt has a number.  Lifecycle events from any other attempt, or
//!   arriving after teardown, are ignored.
//! - Teardown always stops audio before the transport is released.
//! - Each transition produces exactly one [`Notification`].

use std::time::Duration;

use relay_core::{
    encode_command, CaptureConfig, ConnectionEndpoint, EndpointError, GestureTranslator, KeyName,
    MouseButton, ProtocolError, RelayCommand, ScrollDirection,
};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::application::audio_session::AudioRelaySession;
use crate::application::emitters;
use crate::application::ports::{
    AudioError, HapticFeedback, MicrophoneSource, Notifier, OutboundFrame, TransportConnector,
    TransportError, TransportHandle,
};
use crate::domain::config::DeviceConfig;
use crate::domain::state::{
    ConnectionState, Notification, NotificationKind, TransportEvent, TransportEventKind,
};

/// Errors returned by session operations.
///
/// Each error has already been reported to the user through the notifier
/// (where the operation reports anything at all); the return value is for
/// callers and tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Manual fields or a scanned URL failed validation.
    #[error("invalid address format: {0}")]
    InvalidAddressFormat(#[from] EndpointError),

    /// The transport could not be started.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// `connect()` while an attempt is still in flight.
    #[error("a connection attempt is already in progress")]
    ConnectInProgress,

    /// `connect()` while already connected.
    #[error("already connected")]
    AlreadyConnected,

    /// An input action while not connected.
    #[error("not connected")]
    NotConnected,

    /// `start_audio()` while the microphone is already streaming.
    #[error("audio is already streaming")]
    AudioAlreadyActive,

    /// The microphone could not be acquired.
    #[error("microphone unavailable: {0}")]
    MicrophoneUnavailable(#[from] AudioError),

    /// `reconnect()` before any endpoint was used.
    #[error("no previous endpoint to reconnect to")]
    NoEndpoint,

    /// The outbound queue refused a frame.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A command could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Tunables taken from the device config.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub capture: CaptureConfig,
    pub sensitivity: f64,
    pub click_pulse: Duration,
    pub key_pulse: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            sensitivity: relay_core::domain::gesture::DEFAULT_SENSITIVITY,
            click_pulse: Duration::from_millis(30),
            key_pulse: Duration::from_millis(20),
        }
    }
}

impl SessionSettings {
    /// Session tunables from the persisted device config.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            capture: config.audio.capture_config(),
            sensitivity: config.gesture.sensitivity,
            click_pulse: config.haptics.click_pulse(),
            key_pulse: config.haptics.key_pulse(),
        }
    }
}

/// The adapters the session drives.
pub struct SessionPorts {
    pub connector: Box<dyn TransportConnector>,
    pub microphone: Box<dyn MicrophoneSource>,
    pub haptics: Box<dyn HapticFeedback>,
    pub notifier: Box<dyn Notifier>,
}

/// The owned session aggregate.
pub struct RemoteSession {
    state: ConnectionState,
    attempt: u64,
    endpoint: Option<ConnectionEndpoint>,
    transport: Option<Box<dyn TransportHandle>>,
    gesture: GestureTranslator,
    audio: Option<AudioRelaySession>,
    ports: SessionPorts,
    settings: SessionSettings,
    events: UnboundedSender<TransportEvent>,
}

impl RemoteSession {
    /// Creates a disconnected session.  Transport lifecycle events for every
    /// attempt are delivered to `events`; feed them back through
    /// [`handle_transport_event`](Self::handle_transport_event).
    pub fn new(
        ports: SessionPorts,
        settings: SessionSettings,
        events: UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempt: 0,
            endpoint: None,
            transport: None,
            gesture: GestureTranslator::new(settings.sensitivity),
            audio: None,
            ports,
            settings,
            events,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_audio_active(&self) -> bool {
        self.audio.as_ref().is_some_and(AudioRelaySession::is_active)
    }

    /// The most recently used endpoint, if any.
    pub fn endpoint(&self) -> Option<&ConnectionEndpoint> {
        self.endpoint.as_ref()
    }

    /// The number of the current (or last) connect attempt.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    // ── Connection ────────────────────────────────────────────────────────────

    /// Connects using the three manual entry fields.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect); validation failures return
    /// [`SessionError::InvalidAddressFormat`].
    pub fn connect_manual(&mut self, host: &str, port: &str, pin: &str) -> Result<(), SessionError> {
        self.reject_if_busy()?;
        match ConnectionEndpoint::from_manual(host, port, pin) {
            Ok(endpoint) => self.connect(endpoint),
            Err(e) => {
                warn!("manual connection details rejected: {e}");
                self.notify(
                    NotificationKind::InvalidAddress,
                    format!("Invalid address format: {e}"),
                );
                Err(e.into())
            }
        }
    }

    /// Connects using a connection URL (`ws://host:port?pin=XXXX`).
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect); a malformed URL returns
    /// [`SessionError::InvalidAddressFormat`] without any network attempt.
    pub fn connect_url(&mut self, url: &str) -> Result<(), SessionError> {
        self.reject_if_busy()?;
        match ConnectionEndpoint::parse_url(url) {
            Ok(endpoint) => self.connect(endpoint),
            Err(e) => {
                warn!("connection URL rejected: {e}");
                self.notify(NotificationKind::InvalidAddress, "Invalid QR code format");
                Err(e.into())
            }
        }
    }

    /// A QR code was decoded; its payload is a connection URL.
    ///
    /// # Errors
    ///
    /// Same as [`connect_url`](Self::connect_url).
    pub fn on_qr_scanned(&mut self, payload: &str) -> Result<(), SessionError> {
        debug!("QR code scanned ({} bytes)", payload.len());
        self.connect_url(payload)
    }

    /// The QR decoder failed.  Reports it; the state is unchanged.
    pub fn on_qr_error(&mut self, message: &str) {
        warn!("QR scan failed: {message}");
        self.notify(
            NotificationKind::ScanFailed,
            format!("Failed to scan QR code: {message}"),
        );
    }

    /// Connects to an already validated endpoint.
    ///
    /// The session moves to `Connecting` and the transport reports the
    /// outcome asynchronously.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ConnectInProgress`] / [`SessionError::AlreadyConnected`]
    ///   when a transport already exists.
    /// - [`SessionError::ConnectionError`] when the transport cannot even be
    ///   started; the session is back in `Disconnected`.
    pub fn connect(&mut self, endpoint: ConnectionEndpoint) -> Result<(), SessionError> {
        self.reject_if_busy()?;

        self.attempt += 1;
        let attempt = self.attempt;
        info!("connect attempt {attempt}: connecting to {endpoint}");

        self.state = ConnectionState::Connecting;
        self.gesture.on_contact_end();
        let opened = self
            .ports
            .connector
            .open(&endpoint, attempt, self.events.clone());
        self.endpoint = Some(endpoint);

        match opened {
            Ok(handle) => {
                self.transport = Some(handle);
                Ok(())
            }
            Err(e) => {
                warn!("connect attempt {attempt}: could not start transport: {e}");
                self.state = ConnectionState::Disconnected;
                self.notify(
                    NotificationKind::ConnectionFailed,
                    format!("Connection error: {e}"),
                );
                Err(SessionError::ConnectionError(e.to_string()))
            }
        }
    }

    /// Connects again to the last endpoint.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoEndpoint`] if nothing was connected before, plus
    /// everything [`connect`](Self::connect) returns.
    pub fn reconnect(&mut self) -> Result<(), SessionError> {
        self.reject_if_busy()?;
        let endpoint = self.endpoint.clone().ok_or(SessionError::NoEndpoint)?;
        self.connect(endpoint)
    }

    /// Closes the connection on user request.  A no-op when already
    /// disconnected.
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            debug!("disconnect requested while already disconnected");
            return;
        }
        info!("connect attempt {}: disconnecting", self.attempt);
        self.teardown();
        self.notify(NotificationKind::Disconnected, "Disconnected");
    }

    /// Applies one transport lifecycle event.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if event.attempt != self.attempt || self.transport.is_none() {
            debug!(
                "ignoring stale transport event from attempt {} (current {})",
                event.attempt, self.attempt
            );
            return;
        }

        match (self.state, event.kind) {
            (ConnectionState::Connecting, TransportEventKind::Opened) => {
                info!("connect attempt {}: connected", self.attempt);
                self.state = ConnectionState::Connected;
                self.notify(NotificationKind::Connected, "Connected to desktop");
            }
            (ConnectionState::Connecting, TransportEventKind::Error(reason)) => {
                warn!("connect attempt {}: failed: {reason}", self.attempt);
                self.teardown();
                self.notify(
                    NotificationKind::ConnectionFailed,
                    "Connection error. Check IP and PIN.",
                );
            }
            (ConnectionState::Connecting, TransportEventKind::Closed) => {
                warn!("connect attempt {}: closed during handshake", self.attempt);
                self.teardown();
                self.notify(
                    NotificationKind::ConnectionFailed,
                    "Connection error. Check IP and PIN.",
                );
            }
            (ConnectionState::Connected, TransportEventKind::Error(reason)) => {
                warn!("connect attempt {}: connection error: {reason}", self.attempt);
                self.teardown();
                self.notify(NotificationKind::ConnectionLost, "Connection lost");
            }
            (ConnectionState::Connected, TransportEventKind::Closed) => {
                warn!("connect attempt {}: closed by host", self.attempt);
                self.teardown();
                self.notify(NotificationKind::ConnectionLost, "Connection lost");
            }
            (state, kind) => {
                debug!("ignoring transport event {kind:?} in state {state}");
            }
        }
    }

    // ── Touchpad ──────────────────────────────────────────────────────────────

    /// Feeds one touch sample from the pad.
    ///
    /// The tracker follows the finger even while disconnected, so connecting
    /// mid-contact never produces a jump.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] when a move was produced but cannot be
    /// sent, or a queue error.
    pub fn touch_move(&mut self, x: f64, y: f64) -> Result<(), SessionError> {
        match self.gesture.on_move(x, y) {
            Some(cmd) => self.send(cmd),
            None => Ok(()),
        }
    }

    /// The finger left the pad.
    pub fn touch_end(&mut self) {
        self.gesture.on_contact_end();
    }

    // ── Buttons and keys ──────────────────────────────────────────────────────

    /// Clicks a mouse button.  Pulses the haptic actuator first.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] or a queue error.
    pub fn click(&mut self, button: MouseButton) -> Result<(), SessionError> {
        self.pulse(self.settings.click_pulse);
        self.send(emitters::click(button))
    }

    /// Scrolls one notch.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] or a queue error.
    pub fn scroll(&mut self, direction: ScrollDirection) -> Result<(), SessionError> {
        self.send(emitters::scroll(direction))
    }

    /// Presses a key from the fixed vocabulary.  Pulses the haptic actuator
    /// first.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] or a queue error.
    pub fn key_press(&mut self, key: KeyName) -> Result<(), SessionError> {
        self.pulse(self.settings.key_pulse);
        self.send(emitters::key_press(key))
    }

    /// Sends the text buffer and clears it.
    ///
    /// A blank buffer sends nothing and is left unchanged, as is any buffer
    /// that could not be sent.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] or a queue error.
    pub fn send_text(&mut self, buffer: &mut String) -> Result<(), SessionError> {
        let Some(cmd) = emitters::text(buffer) else {
            debug!("blank text buffer; nothing sent");
            return Ok(());
        };
        self.send(cmd)?;
        buffer.clear();
        self.notify(NotificationKind::TextSent, "Text sent");
        Ok(())
    }

    // ── Microphone ────────────────────────────────────────────────────────────

    /// Starts streaming the microphone.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotConnected`] unless connected.
    /// - [`SessionError::AudioAlreadyActive`] if already streaming.
    /// - [`SessionError::MicrophoneUnavailable`] when capture cannot start.
    pub fn start_audio(&mut self) -> Result<(), SessionError> {
        if !self.is_connected() {
            debug!("start_audio ignored: not connected");
            return Err(SessionError::NotConnected);
        }
        if self.is_audio_active() {
            return Err(SessionError::AudioAlreadyActive);
        }

        match AudioRelaySession::start(self.ports.microphone.as_mut(), self.settings.capture) {
            Ok(audio) => {
                self.audio = Some(audio);
                self.notify(NotificationKind::MicrophoneOn, "Microphone activated");
                Ok(())
            }
            Err(e) => {
                warn!("could not start audio capture: {e}");
                self.notify(
                    NotificationKind::MicrophoneUnavailable,
                    "Microphone access denied",
                );
                Err(e.into())
            }
        }
    }

    /// Stops streaming and purges any audio still queued for the wire.
    /// Safe to call at any time.
    pub fn stop_audio(&mut self) {
        if self.release_audio() {
            self.notify(NotificationKind::MicrophoneOff, "Microphone deactivated");
        }
    }

    /// The microphone button: starts when idle, stops when streaming.
    ///
    /// # Errors
    ///
    /// Same as [`start_audio`](Self::start_audio) when starting.
    pub fn toggle_audio(&mut self) -> Result<(), SessionError> {
        if self.is_audio_active() {
            self.stop_audio();
            Ok(())
        } else {
            self.start_audio()
        }
    }

    /// One chunk interval elapsed.  Sends the captured audio, if any.
    ///
    /// Send failures are dropped: a broken connection is handled by the
    /// transport's own lifecycle event.
    pub fn audio_tick(&mut self) {
        if !self.is_connected() {
            return;
        }
        let Some(chunk) = self.audio.as_mut().and_then(AudioRelaySession::tick) else {
            return;
        };
        if let Err(e) = self.send(chunk) {
            debug!("audio chunk dropped: {e}");
        }
    }

    /// Tears everything down without a notification.  Used on exit.
    pub fn shutdown(&mut self) {
        if self.state != ConnectionState::Disconnected || self.is_audio_active() {
            info!("shutting down session");
        }
        self.teardown();
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn reject_if_busy(&mut self) -> Result<(), SessionError> {
        let err = match self.state {
            ConnectionState::Disconnected => return Ok(()),
            ConnectionState::Connecting => SessionError::ConnectInProgress,
            ConnectionState::Connected => SessionError::AlreadyConnected,
        };
        warn!("connect rejected: {err}");
        self.notify(NotificationKind::ConnectRejected, err.to_string());
        Err(err)
    }

    /// Stops audio, then releases the transport.  Ends in `Disconnected`.
    fn teardown(&mut self) {
        self.release_audio();
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.gesture.on_contact_end();
        self.state = ConnectionState::Disconnected;
    }

    /// Stops the audio session if one exists.  Returns whether one did.
    fn release_audio(&mut self) -> bool {
        let Some(mut audio) = self.audio.take() else {
            return false;
        };
        audio.stop();
        if let Some(transport) = self.transport.as_ref() {
            transport.discard_pending_audio();
        }
        true
    }

    fn send(&mut self, cmd: RelayCommand) -> Result<(), SessionError> {
        let transport = match (self.state, self.transport.as_ref()) {
            (ConnectionState::Connected, Some(t)) => t,
            _ => {
                debug!("{} not sent: not connected", cmd.type_name());
                return Err(SessionError::NotConnected);
            }
        };

        let text = encode_command(&cmd)?;
        let frame = if cmd.is_audio() {
            OutboundFrame::audio(text)
        } else {
            OutboundFrame::control(text)
        };

        transport.send(frame).map_err(|e| {
            if !cmd.is_audio() {
                warn!("{} not sent: {e}", cmd.type_name());
            }
            SessionError::from(e)
        })
    }

    fn pulse(&self, duration: Duration) {
        if let Err(e) = self.ports.haptics.pulse(duration) {
            debug!("{e}");
        }
    }

    fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        self.ports.notifier.notify(Notification::new(kind, message));
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
