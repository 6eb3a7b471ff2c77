//! WebSocket server: accept loop and per-device session tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from devices.
//! 3. Checking the `pin` query parameter during the HTTP upgrade; a missing or
//!    wrong PIN gets `401 Unauthorized` and no WebSocket.
//! 4. Decoding each text frame and dispatching it to the [`InputSink`].
//!    Malformed frames are logged and discarded; the connection stays open.
//! 5. Stopping the accept loop when the `running` flag is cleared.
//!
//! Each device runs in its own Tokio task.  Several devices may be connected
//! at once; their commands reach the sink interleaved and uncoordinated.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response},
        http::StatusCode,
        Error as WsError, Message as WsMessage,
    },
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::{dispatch_frame, HostError, InputSink};
use crate::domain::config::HostConfig;
use crate::domain::pin::{pin_from_query, pin_matches};

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.bind_addr` and serves until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound.
pub async fn run_server(
    config: HostConfig,
    sink: Arc<dyn InputSink>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {}", config.bind_addr))?;

    serve(listener, config, sink, running).await
}

/// Runs the accept loop on an already-bound listener.
///
/// Split from [`run_server`] so tests can bind port 0 and learn the port
/// before serving.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub async fn serve(
    listener: TcpListener,
    config: HostConfig,
    sink: Arc<dyn InputSink>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let local_addr = listener
        .local_addr()
        .context("failed to read listener address")?;
    info!("relay host listening on {local_addr}");

    let config = Arc::new(config);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short accept timeout so the shutdown flag is checked regularly.
        match timeout(config.accept_poll, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new connection from {peer_addr}");
                let cfg = Arc::clone(&config);
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    handle_device_session(stream, peer_addr, cfg, sink).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }

    Ok(())
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// What happened during one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SessionStats {
    dispatched: u64,
    discarded: u64,
    sink_errors: u64,
}

async fn handle_device_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<HostConfig>,
    sink: Arc<dyn InputSink>,
) {
    let session_id = Uuid::new_v4();
    match run_session(raw_stream, peer_addr, session_id, config, sink).await {
        Ok(stats) => info!(
            "session {session_id} ({peer_addr}) closed: {} dispatched, {} discarded, {} sink errors",
            stats.dispatched, stats.discarded, stats.sink_errors
        ),
        Err(e) => warn!("session {session_id} ({peer_addr}) closed with error: {e:#}"),
    }
}

async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    session_id: Uuid,
    config: Arc<HostConfig>,
    sink: Arc<dyn InputSink>,
) -> anyhow::Result<SessionStats> {
    // ── Step 1: handshake with PIN check ──────────────────────────────────────
    let expected = config.pin.clone();
    let check_pin = move |request: &Request, response: Response| {
        let offered = pin_from_query(request.uri().query());
        if pin_matches(&expected, offered.as_deref()) {
            Ok(response)
        } else {
            Err(unauthorized())
        }
    };

    let mut ws_stream = accept_hdr_async(raw_stream, check_pin)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("session {session_id}: device {peer_addr} connected");

    // ── Step 2: read frames until the device leaves ───────────────────────────
    let mut stats = SessionStats::default();

    loop {
        let msg = match ws_stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) | None => {
                debug!("session {session_id}: stream ended");
                break;
            }
            Some(Err(e)) => {
                return Err(e).with_context(|| format!("session {session_id}: read failed"));
            }
        };

        match msg {
            WsMessage::Text(frame) => match dispatch_frame(sink.as_ref(), &frame) {
                Ok(type_name) => {
                    stats.dispatched += 1;
                    debug!("session {session_id}: {type_name}");
                }
                Err(HostError::MalformedFrame(e)) => {
                    stats.discarded += 1;
                    warn!("session {session_id}: discarding frame: {e}");
                }
                Err(HostError::Sink(e)) => {
                    stats.sink_errors += 1;
                    warn!("session {session_id}: {e}");
                }
            },
            WsMessage::Binary(_) => {
                debug!("session {session_id}: ignoring binary frame");
            }
            WsMessage::Close(_) => {
                debug!("session {session_id}: device sent close");
                break;
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
        }
    }

    Ok(stats)
}

fn unauthorized() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("invalid pin".to_string()));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}
