//! End-to-end tests: a real `RemoteSession` driving `WsConnector` against a
//! local tokio-tungstenite server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_core::{decode_frame, KeyName, MouseButton, RelayCommand, ScrollDirection};
use relay_device::application::event_loop::{run_event_loop, SessionEvent, UiAction};
use relay_device::application::ports::{HapticError, HapticFeedback, Notifier};
use relay_device::application::session::{RemoteSession, SessionPorts, SessionSettings};
use relay_device::domain::state::{Notification, NotificationKind};
use relay_device::infrastructure::audio_capture::mock::MockMicrophone;
use relay_device::infrastructure::transport::WsConnector;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

// ── Helpers ───────────────────────────────────────────────────────────────────

struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn pulse(&self, _duration: Duration) -> Result<(), HapticError> {
        Ok(())
    }
}

struct ChannelNotifier(UnboundedSender<Notification>);

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.0.send(notification);
    }
}

/// Server behaviour after the handshake.
#[derive(Clone, Copy)]
enum ServerMode {
    /// Forward every text frame to the test until the client closes.
    Collect,
    /// Close the connection immediately.
    CloseAtOnce,
}

/// Accepts one WebSocket connection and returns `(port, received frames)`.
async fn start_server(mode: ServerMode) -> (u16, UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        if let ServerMode::CloseAtOnce = mode {
            let _ = ws.close(None).await;
            return;
        }
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let _ = frames_tx.send(text.to_string());
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    (port, frames_rx)
}

struct Device {
    ui: mpsc::Sender<SessionEvent>,
    notifications: UnboundedReceiver<Notification>,
    mic: MockMicrophone,
    task: tokio::task::JoinHandle<RemoteSession>,
}

fn start_device(chunk_ms: u64) -> Device {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ui_tx, ui_rx) = mpsc::channel(64);
    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let mic = MockMicrophone::new();
    let mut settings = SessionSettings::default();
    settings.capture.chunk_interval = Duration::from_millis(chunk_ms);

    let session = RemoteSession::new(
        SessionPorts {
            connector: Box::new(WsConnector::new(64).with_connect_timeout(Duration::from_secs(2))),
            microphone: Box::new(mic.clone()),
            haptics: Box::new(NoHaptics),
            notifier: Box::new(ChannelNotifier(notify_tx)),
        },
        settings,
        events_tx,
    );
    Device {
        ui: ui_tx,
        notifications: notify_rx,
        mic,
        task: tokio::spawn(run_event_loop(session, ui_rx, events_rx)),
    }
}

impl Device {
    async fn act(&self, action: UiAction) {
        self.ui.send(SessionEvent::Ui(action)).await.unwrap();
    }

    async fn next_notification(&mut self) -> NotificationKind {
        timeout(WAIT, self.notifications.recv())
            .await
            .expect("notification within timeout")
            .expect("notifier alive")
            .kind
    }

    async fn shutdown(self) -> RemoteSession {
        self.ui.send(SessionEvent::Shutdown).await.unwrap();
        timeout(WAIT, self.task).await.unwrap().unwrap()
    }
}

async fn next_command(frames: &mut UnboundedReceiver<String>) -> RelayCommand {
    let text = timeout(WAIT, frames.recv())
        .await
        .expect("frame within timeout")
        .expect("server alive");
    decode_frame(&text).expect("device sends well-formed frames")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_commands_reach_host_in_order() {
    // Arrange
    let (port, mut frames) = start_server(ServerMode::Collect).await;
    let mut device = start_device(100);
    device
        .act(UiAction::ConnectManual {
            host: "127.0.0.1".into(),
            port: port.to_string(),
            pin: "1234".into(),
        })
        .await;
    assert_eq!(device.next_notification().await, NotificationKind::Connected);

    // Act
    device.act(UiAction::TouchMove { x: 0.0, y: 0.0 }).await;
    device.act(UiAction::TouchMove { x: 5.0, y: -2.0 }).await;
    device.act(UiAction::Click(MouseButton::Right)).await;
    device.act(UiAction::Scroll(ScrollDirection::Down)).await;
    device.act(UiAction::Key(KeyName::Enter)).await;
    device.act(UiAction::EditText("hello".into())).await;
    device.act(UiAction::SendText).await;

    // Assert
    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::MouseMove { dx: 10, dy: -4 }
    );
    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::MouseClick {
            button: MouseButton::Right
        }
    );
    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::MouseScroll {
            direction: ScrollDirection::Down
        }
    );
    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::KeyPress {
            key: KeyName::Enter
        }
    );
    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::TextType {
            text: "hello".into()
        }
    );

    device.shutdown().await;
}

#[tokio::test]
async fn test_microphone_audio_is_streamed() {
    let (port, mut frames) = start_server(ServerMode::Collect).await;
    let mut device = start_device(20);
    device
        .act(UiAction::ConnectUrl(format!("ws://127.0.0.1:{port}?pin=1234")))
        .await;
    assert_eq!(device.next_notification().await, NotificationKind::Connected);

    device.act(UiAction::ToggleMicrophone).await;
    assert_eq!(device.next_notification().await, NotificationKind::MicrophoneOn);
    device.mic.feed(&[1, -1]);

    assert_eq!(
        next_command(&mut frames).await,
        RelayCommand::AudioChunk {
            data: "AQD//w==".into()
        }
    );
    let session = device.shutdown().await;
    assert!(!session.is_audio_active());
}

#[tokio::test]
async fn test_host_closing_reports_connection_lost() {
    let (port, _frames) = start_server(ServerMode::CloseAtOnce).await;
    let mut device = start_device(100);

    device
        .act(UiAction::ConnectUrl(format!("ws://127.0.0.1:{port}?pin=1")))
        .await;

    assert_eq!(device.next_notification().await, NotificationKind::Connected);
    assert_eq!(
        device.next_notification().await,
        NotificationKind::ConnectionLost
    );
    let session = device.shutdown().await;
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_refused_connection_reports_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let mut device = start_device(100);

    device
        .act(UiAction::ConnectUrl(format!("ws://127.0.0.1:{port}?pin=1")))
        .await;

    assert_eq!(
        device.next_notification().await,
        NotificationKind::ConnectionFailed
    );
    device.shutdown().await;
}
