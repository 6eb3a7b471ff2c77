//! Remote input relay: device entry point.
//!
//! Runs the handheld side of the relay in a terminal.  Lines typed on stdin
//! stand in for touch-pad gestures, buttons and the text box; see
//! [`relay_device::infrastructure::console`] for the command set.
//!
//! # Usage
//!
//! ```text
//! relay-device [OPTIONS]
//!
//! Options:
//!   --url <URL>            Connect to a `ws://host:port?pin=XXXX` URL on start
//!   --host <HOST>          Manual entry: host (requires --port and --pin)
//!   --port <PORT>          Manual entry: port
//!   --pin <PIN>            Manual entry: PIN (at most 4 characters)
//!   --config <PATH>        Config file [default: platform config dir]
//!   --input-device <NAME>  Microphone to open (cpal-capture builds)
//!   --write-config         Write the effective config file and exit
//! ```
//!
//! # Architecture overview
//!
//! ```text
//! stdin ──▶ console::parse_line ──▶ UiAction ─┐
//!                                             ▼
//!                         run_event_loop ── RemoteSession ──▶ WsConnector ──▶ host
//!                                             ▲
//!           transport task ── TransportEvent ─┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use relay_device::application::event_loop::{run_event_loop, SessionEvent, UiAction};
use relay_device::application::session::{RemoteSession, SessionPorts, SessionSettings};
use relay_device::domain::config::{load_config, save_config};
use relay_device::infrastructure::audio_capture::default_microphone;
use relay_device::infrastructure::console::{parse_line, ConsoleCommand, HELP};
use relay_device::infrastructure::feedback::{ConsoleNotifier, LogHaptics};
use relay_device::infrastructure::transport::WsConnector;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Handheld side of the remote input relay.
#[derive(Debug, Parser)]
#[command(
    name = "relay-device",
    about = "Drive a desktop's mouse and keyboard over WebSocket",
    version
)]
struct Cli {
    /// Connection URL, as encoded in the host's QR code.
    #[arg(long, env = "RELAY_URL", conflicts_with_all = ["host", "port", "pin"])]
    url: Option<String>,

    /// Host address for manual entry.
    #[arg(long, requires_all = ["port", "pin"])]
    host: Option<String>,

    /// Port for manual entry.
    #[arg(long, requires = "host")]
    port: Option<String>,

    /// PIN for manual entry.
    #[arg(long, requires = "host")]
    pin: Option<String>,

    /// Path to the device config file.
    #[arg(long, env = "RELAY_DEVICE_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the input device to capture from.
    #[arg(long)]
    input_device: Option<String>,

    /// Write the effective config to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// The connect action to run at start-up, if any.
    fn initial_action(&self) -> Option<UiAction> {
        if let Some(url) = &self.url {
            return Some(UiAction::ConnectUrl(url.clone()));
        }
        match (&self.host, &self.port, &self.pin) {
            (Some(host), Some(port), Some(pin)) => Some(UiAction::ConnectManual {
                host: host.clone(),
                port: port.clone(),
                pin: pin.clone(),
            }),
            _ => None,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load device config")?;

    if cli.write_config {
        save_config(&config, cli.config.as_deref()).context("failed to write device config")?;
        println!("config written");
        return Ok(());
    }

    // `RUST_LOG` wins over the level in the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let instance_id = Uuid::new_v4();
    info!(%instance_id, "relay device starting");

    // ── Session wiring ────────────────────────────────────────────────────────
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ui_tx, ui_rx) = mpsc::channel::<SessionEvent>(64);

    let session = RemoteSession::new(
        SessionPorts {
            connector: Box::new(WsConnector::new(config.transport.outbound_queue_capacity)),
            microphone: default_microphone(cli.input_device.clone()),
            haptics: Box::new(LogHaptics),
            notifier: Box::new(ConsoleNotifier),
        },
        SessionSettings::from_config(&config),
        events_tx,
    );
    let event_loop = tokio::spawn(run_event_loop(session, ui_rx, events_rx));

    if let Some(action) = cli.initial_action() {
        ui_tx
            .send(SessionEvent::Ui(action))
            .await
            .context("event loop stopped before start-up")?;
    }

    println!("{HELP}");

    // ── Console input loop ────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => line.context("failed to read stdin")?,
        };

        let Some(line) = line else {
            break;
        };

        match parse_line(&line) {
            Ok(ConsoleCommand::Actions(actions)) => {
                for action in actions {
                    if ui_tx.send(SessionEvent::Ui(action)).await.is_err() {
                        warn!("event loop is gone");
                        break;
                    }
                }
            }
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    let _ = ui_tx.send(SessionEvent::Shutdown).await;
    let session = event_loop.await.context("event loop panicked")?;
    info!(state = %session.state(), "relay device stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
