//! The session event loop.
//!
//! One Tokio task owns the [`RemoteSession`] and feeds it, one event at a
//! time, from three sources:
//!
//! 1. transport lifecycle events (so the state is current before any action),
//! 2. UI actions and shutdown,
//! 3. the audio chunk ticker, armed only while the microphone is streaming.
//!
//! Every handler runs to completion before the next event is taken, so an
//! action that stops audio always lands before the next tick.

use relay_core::{KeyName, MouseButton, ScrollDirection};
use tokio::sync::mpsc::{Receiver, UnboundedReceiver};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::application::session::{RemoteSession, SessionError};
use crate::domain::state::TransportEvent;

/// A discrete user action.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// The manual entry form was submitted.
    ConnectManual {
        host: String,
        port: String,
        pin: String,
    },
    /// A connection URL was entered.
    ConnectUrl(String),
    /// The QR decoder produced a payload.
    QrScanned(String),
    /// The QR decoder failed.
    QrError(String),
    /// Connect again to the last endpoint.
    Reconnect,
    Disconnect,
    TouchMove {
        x: f64,
        y: f64,
    },
    TouchEnd,
    Click(MouseButton),
    Scroll(ScrollDirection),
    Key(KeyName),
    /// Replaces the contents of the text input.
    EditText(String),
    /// Sends the text input.
    SendText,
    /// The microphone button.
    ToggleMicrophone,
}

/// Input to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Ui(UiAction),
    Shutdown,
}

/// Runs the session until [`SessionEvent::Shutdown`] arrives or every UI
/// sender is dropped.  Tears the session down and returns it.
pub async fn run_event_loop(
    mut session: RemoteSession,
    mut ui: Receiver<SessionEvent>,
    mut transport: UnboundedReceiver<TransportEvent>,
) -> RemoteSession {
    let mut ticker = interval(session.settings().capture.chunk_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut text_buffer = String::new();

    info!("session event loop started");

    loop {
        let audio_was_active = session.is_audio_active();

        tokio::select! {
            biased;

            Some(event) = transport.recv() => {
                session.handle_transport_event(event);
            }

            event = ui.recv() => match event {
                Some(SessionEvent::Ui(action)) => {
                    apply_action(&mut session, &mut text_buffer, action);
                }
                Some(SessionEvent::Shutdown) | None => break,
            },

            _ = ticker.tick(), if audio_was_active => {
                session.audio_tick();
            }
        }

        // The first chunk of a new audio session is one full interval after
        // the microphone came on.
        if !audio_was_active && session.is_audio_active() {
            ticker.reset();
        }
    }

    session.shutdown();
    info!("session event loop stopped");
    session
}

/// Applies one UI action.  Failures were already reported to the user by
/// the session; they are only logged here.
fn apply_action(session: &mut RemoteSession, text_buffer: &mut String, action: UiAction) {
    let result = match action {
        UiAction::ConnectManual { host, port, pin } => session.connect_manual(&host, &port, &pin),
        UiAction::ConnectUrl(url) => session.connect_url(&url),
        UiAction::QrScanned(payload) => session.on_qr_scanned(&payload),
        UiAction::QrError(message) => {
            session.on_qr_error(&message);
            Ok(())
        }
        UiAction::Reconnect => session.reconnect(),
        UiAction::Disconnect => {
            session.disconnect();
            Ok(())
        }
        UiAction::TouchMove { x, y } => session.touch_move(x, y),
        UiAction::TouchEnd => {
            session.touch_end();
            Ok(())
        }
        UiAction::Click(button) => session.click(button),
        UiAction::Scroll(direction) => session.scroll(direction),
        UiAction::Key(key) => session.key_press(key),
        UiAction::EditText(text) => {
            *text_buffer = text;
            Ok(())
        }
        UiAction::SendText => session.send_text(text_buffer),
        UiAction::ToggleMicrophone => session.toggle_audio(),
    };

    match result {
        Ok(()) | Err(SessionError::NotConnected) => {}
        Err(e) => debug!("action failed: {e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use relay_core::{decode_frame, CaptureConfig, RelayCommand};
    use tokio::sync::mpsc::{channel, unbounded_channel, Sender};

    use super::*;
    use crate::application::ports::{HapticError, HapticFeedback, Notifier};
    use crate::application::session::{SessionPorts, SessionSettings};
    use crate::domain::state::{ConnectionState, Notification, TransportEventKind};
    use crate::infrastructure::audio_capture::mock::MockMicrophone;
    use crate::infrastructure::transport::mock::MockConnector;

    struct NoHaptics;

    impl HapticFeedback for NoHaptics {
        fn pulse(&self, _duration: Duration) -> Result<(), HapticError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<Notification>>>);

    impl Notifier for Collect {
        fn notify(&self, n: Notification) {
            self.0.lock().unwrap().push(n);
        }
    }

    struct Harness {
        ui: Sender<SessionEvent>,
        connector: MockConnector,
        mic: MockMicrophone,
        task: tokio::task::JoinHandle<RemoteSession>,
    }

    fn start(chunk_ms: u64) -> Harness {
        let connector = MockConnector::auto_open();
        let mic = MockMicrophone::new();
        let (events_tx, events_rx) = unbounded_channel();
        let (ui_tx, ui_rx) = channel(64);
        let settings = SessionSettings {
            capture: CaptureConfig {
                chunk_interval: Duration::from_millis(chunk_ms),
                ..CaptureConfig::default()
            },
            ..SessionSettings::default()
        };
        let session = RemoteSession::new(
            SessionPorts {
                connector: Box::new(connector.clone()),
                microphone: Box::new(mic.clone()),
                haptics: Box::new(NoHaptics),
                notifier: Box::new(Collect::default()),
            },
            settings,
            events_tx,
        );
        let task = tokio::spawn(run_event_loop(session, ui_rx, events_rx));
        Harness {
            ui: ui_tx,
            connector,
            mic,
            task,
        }
    }

    async fn act(h: &Harness, action: UiAction) {
        h.ui.send(SessionEvent::Ui(action)).await.unwrap();
    }

    /// Waits until the loop has handled a connect and opened a transport.
    async fn wait_for_open(h: &Harness) {
        for _ in 0..100 {
            if !h.connector.opened_urls().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no transport was opened");
    }

    async fn finish(h: Harness) -> (RemoteSession, MockConnector, MockMicrophone) {
        h.ui.send(SessionEvent::Shutdown).await.unwrap();
        let session = tokio::time::timeout(Duration::from_secs(2), h.task)
            .await
            .expect("loop must stop")
            .expect("loop must not panic");
        (session, h.connector, h.mic)
    }

    #[tokio::test]
    async fn test_lifecycle_event_is_applied_before_next_action() {
        // Arrange
        let h = start(100);

        // Act: the mock reports Opened during connect; the click right after
        // must already see the connected state.
        act(&h, UiAction::ConnectUrl("ws://10.0.0.2:8765?pin=1111".into())).await;
        act(&h, UiAction::Click(MouseButton::Left)).await;
        let (session, connector, _) = finish(h).await;

        // Assert
        let sent: Vec<RelayCommand> = connector
            .sent_texts()
            .iter()
            .map(|t| decode_frame(t).unwrap())
            .collect();
        assert_eq!(
            sent,
            vec![RelayCommand::MouseClick {
                button: MouseButton::Left
            }]
        );
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(connector.closed_count(), 1, "shutdown closes the transport");
    }

    #[tokio::test]
    async fn test_text_is_edited_then_sent() {
        let h = start(100);

        act(&h, UiAction::ConnectUrl("ws://10.0.0.2:8765?pin=1111".into())).await;
        act(&h, UiAction::EditText("ls -la".into())).await;
        act(&h, UiAction::SendText).await;
        act(&h, UiAction::SendText).await;
        let (_, connector, _) = finish(h).await;

        assert_eq!(
            connector.sent_texts(),
            vec![r#"{"type":"text_type","text":"ls -la"}"#.to_string()],
            "the buffer is cleared after the first send"
        );
    }

    #[tokio::test]
    async fn test_audio_ticks_stream_chunks_and_stop_on_shutdown() {
        // Arrange
        let h = start(10);
        act(&h, UiAction::ConnectUrl("ws://10.0.0.2:8765?pin=1111".into())).await;
        act(&h, UiAction::ToggleMicrophone).await;

        // Act
        h.mic.feed(&[100; 160]);
        tokio::time::sleep(Duration::from_millis(80)).await;
        let (session, connector, mic) = finish(h).await;

        // Assert
        let chunks = connector
            .sent_texts()
            .iter()
            .filter(|t| decode_frame(t).map(|c| c.is_audio()).unwrap_or(false))
            .count();
        assert_eq!(chunks, 1, "exactly the fed samples were streamed");
        assert!(!session.is_audio_active());
        assert_eq!(mic.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_connection_lost_event_reaches_session() {
        // Arrange
        let h = start(100);
        act(&h, UiAction::ConnectUrl("ws://10.0.0.2:8765?pin=1111".into())).await;
        act(&h, UiAction::TouchMove { x: 0.0, y: 0.0 }).await;
        wait_for_open(&h).await;

        // Act
        h.connector.emit(TransportEventKind::Closed);
        tokio::time::sleep(Duration::from_millis(20)).await;
        act(&h, UiAction::Scroll(ScrollDirection::Up)).await;
        let (session, connector, _) = finish(h).await;

        // Assert
        assert!(connector.sent_texts().is_empty());
        assert_eq!(connector.closed_count(), 1);
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_dropping_all_senders_stops_loop() {
        let h = start(100);
        let Harness { ui, task, .. } = h;

        drop(ui);

        let session = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("loop must stop")
            .unwrap();
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }
}
