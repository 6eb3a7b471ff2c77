//! WebSocket transport built on tokio-tungstenite.
//!
//! Each connect attempt spawns one task that:
//!
//! 1. performs the client handshake against `endpoint.dial_url()` (bounded by
//!    a timeout) and reports `Opened` or `Error`;
//! 2. writes frames popped from the [`OutboundQueue`] as text messages, in
//!    order;
//! 3. watches the read half only for the end of the connection.  The host
//!    sends nothing at the application level, so any text or binary frame is
//!    ignored;
//! 4. reports `Closed` or `Error` when the connection ends on its own.
//!
//! A user-initiated [`TransportHandle::close`] sends a Close frame and ends
//! the task without reporting anything.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_core::{ConnectionEndpoint, RelayScheme};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

use crate::application::outbound::{OutboundQueue, PushOutcome};
use crate::application::ports::{
    OutboundFrame, TransportConnector, TransportError, TransportHandle,
};
use crate::domain::state::TransportEvent;

/// Default bound on the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens real WebSocket connections.
#[derive(Debug, Clone)]
pub struct WsConnector {
    queue_capacity: usize,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

impl TransportConnector for WsConnector {
    fn open(
        &mut self,
        endpoint: &ConnectionEndpoint,
        attempt: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn TransportHandle>, TransportError> {
        if endpoint.scheme() == RelayScheme::Secure && !cfg!(feature = "tls") {
            return Err(TransportError::TlsUnavailable);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::NoRuntime(e.to_string()))?;

        let queue = Arc::new(OutboundQueue::new(self.queue_capacity));
        let (close_tx, close_rx) = oneshot::channel();

        runtime.spawn(run_connection(ConnectionTask {
            url: endpoint.dial_url(),
            label: endpoint.to_string(),
            attempt,
            queue: Arc::clone(&queue),
            close_rx,
            events,
            connect_timeout: self.connect_timeout,
        }));

        Ok(Box::new(WsHandle {
            queue,
            close_tx: Some(close_tx),
        }))
    }
}

/// Handle to one WebSocket connection task.
struct WsHandle {
    queue: Arc<OutboundQueue>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl TransportHandle for WsHandle {
    fn send(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        if self.queue.push(frame)? == PushOutcome::DroppedOldestAudio {
            debug!("outbound queue full; dropped oldest audio frame");
        }
        Ok(())
    }

    fn discard_pending_audio(&self) -> usize {
        self.queue.purge_audio()
    }

    fn close(&mut self) {
        if let Some(close_tx) = self.close_tx.take() {
            self.queue.close();
            let _ = close_tx.send(());
        }
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

struct ConnectionTask {
    /// Full URL including the pin.  Never logged.
    url: String,
    /// `ws://host:port` for log lines.
    label: String,
    attempt: u64,
    queue: Arc<OutboundQueue>,
    close_rx: oneshot::Receiver<()>,
    events: UnboundedSender<TransportEvent>,
    connect_timeout: Duration,
}

async fn run_connection(task: ConnectionTask) {
    let ConnectionTask {
        url,
        label,
        attempt,
        queue,
        mut close_rx,
        events,
        connect_timeout,
    } = task;

    // ── Step 1: handshake ─────────────────────────────────────────────────────
    let connected = tokio::select! {
        _ = &mut close_rx => {
            debug!("attempt {attempt}: closed before the handshake finished");
            return;
        }
        result = timeout(connect_timeout, connect_async(url.as_str())) => result,
    };

    let ws_stream = match connected {
        Ok(Ok((ws_stream, _response))) => ws_stream,
        Ok(Err(e)) => {
            warn!("attempt {attempt}: handshake with {label} failed: {e}");
            let _ = events.send(TransportEvent::error(attempt, e.to_string()));
            return;
        }
        Err(_) => {
            warn!("attempt {attempt}: handshake with {label} timed out");
            let _ = events.send(TransportEvent::error(attempt, "connection timed out"));
            return;
        }
    };

    info!("attempt {attempt}: WebSocket open to {label}");
    let _ = events.send(TransportEvent::opened(attempt));

    // ── Step 2: pump frames until either side ends ────────────────────────────
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let ended = loop {
        tokio::select! {
            _ = &mut close_rx => {
                debug!("attempt {attempt}: closing on request");
                let _ = ws_tx.send(WsMessage::Close(None)).await;
                break None;
            }

            frame = queue.pop() => match frame {
                Some(frame) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(frame.text)).await {
                        break Some(TransportEvent::error(attempt, e.to_string()));
                    }
                }
                None => {
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    break None;
                }
            },

            incoming = ws_rx.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => {
                    break Some(TransportEvent::closed(attempt));
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                Some(Ok(_)) => {
                    debug!("attempt {attempt}: ignoring unexpected frame from host");
                }
                Some(Err(e)) => {
                    break Some(TransportEvent::error(attempt, e.to_string()));
                }
            },
        }
    };

    queue.close();
    if let Some(event) = ended {
        info!("attempt {attempt}: connection to {label} ended");
        let _ = events.send(event);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_secure_endpoint_without_tls_feature_is_rejected() {
        if cfg!(feature = "tls") {
            return;
        }
        let endpoint = ConnectionEndpoint::parse_url("wss://10.0.0.2:443?pin=1").unwrap();
        let (tx, _rx) = unbounded_channel();

        let result = WsConnector::new(8).open(&endpoint, 1, tx);

        assert!(matches!(result, Err(TransportError::TlsUnavailable)));
    }

    #[test]
    fn test_open_outside_runtime_is_an_error() {
        let endpoint = ConnectionEndpoint::parse_url("ws://127.0.0.1:9?pin=1").unwrap();
        let (tx, _rx) = unbounded_channel();

        let result = WsConnector::new(8).open(&endpoint, 1, tx);

        assert!(matches!(result, Err(TransportError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_event() {
        // Arrange: bind then drop a listener to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let endpoint =
            ConnectionEndpoint::from_manual("127.0.0.1", &port.to_string(), "1234").unwrap();
        let (tx, mut rx) = unbounded_channel();

        // Act
        let _handle = WsConnector::new(8)
            .with_connect_timeout(Duration::from_secs(2))
            .open(&endpoint, 7, tx)
            .unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("an event must arrive")
            .expect("channel open");

        // Assert
        assert_eq!(event.attempt, 7);
        assert!(matches!(
            event.kind,
            crate::domain::state::TransportEventKind::Error(_)
        ));
    }
}
