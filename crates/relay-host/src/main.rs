//! Remote input relay: host entry point.
//!
//! Listens for devices on a WebSocket port, prints the connection URL (the
//! QR payload) and logs every command it receives.
//!
//! # Usage
//!
//! ```text
//! relay-host [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>             Address to listen on [default: 0.0.0.0]
//!   --port <PORT>             WebSocket port [default: 8765]
//!   --pin <PIN>               PIN devices must present [default: random 4 digits]
//!   --advertise-host <HOST>   Address put in the connection URL [default: LAN address]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Default     | Description                 |
//! |------------------------|-------------|-----------------------------|
//! | `RELAY_BIND`           | `0.0.0.0`   | Listen address              |
//! | `RELAY_PORT`           | `8765`      | WebSocket port              |
//! | `RELAY_PIN`            | random      | Connection PIN              |
//! | `RELAY_ADVERTISE_HOST` | LAN address | Host in the connection URL  |

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_host::domain::config::DEFAULT_PORT;
use relay_host::domain::pin::generate_pin;
use relay_host::domain::HostConfig;
use relay_host::infrastructure::lan::advertise_host_for;
use relay_host::infrastructure::{run_server, LoggingInputSink};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Desktop host for the remote input relay.
#[derive(Debug, Parser)]
#[command(
    name = "relay-host",
    about = "Receive touchpad, keyboard and audio commands from a relay device",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket listener to.
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_BIND")]
    bind: String,

    /// WebSocket port.
    #[arg(long, default_value_t = DEFAULT_PORT, env = "RELAY_PORT")]
    port: u16,

    /// PIN devices must send.  A random 4-digit PIN is used when omitted.
    #[arg(long, env = "RELAY_PIN")]
    pin: Option<String>,

    /// Host name or IP put in the connection URL.
    #[arg(long, env = "RELAY_ADVERTISE_HOST")]
    advertise_host: Option<String>,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`HostConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address, or if the PIN or
    /// advertised host would not form a valid connection URL.
    fn into_host_config(self) -> anyhow::Result<HostConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.bind, self.port))?;

        let pin = match self.pin {
            Some(pin) => pin.trim().to_string(),
            None => generate_pin(&mut rand::thread_rng()),
        };
        let advertise_host = self
            .advertise_host
            .unwrap_or_else(|| advertise_host_for(bind_addr));

        let config = HostConfig {
            bind_addr,
            advertise_host,
            pin,
            ..HostConfig::default()
        };
        config
            .endpoint()
            .context("PIN or advertised host cannot form a connection URL")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_host_config()?;

    // The URL carries the PIN, so it goes to stdout only, never to the log.
    let url = config.connection_url()?;
    println!("Connection URL (QR payload): {url}");
    info!("advertising {}:{}", config.advertise_host, config.bind_addr.port());

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    run_server(config, Arc::new(LoggingInputSink::new()), running).await?;

    info!("relay host stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments_build_config() {
        let cli = Cli::parse_from([
            "relay-host",
            "--bind",
            "127.0.0.1",
            "--port",
            "9001",
            "--pin",
            "4321",
            "--advertise-host",
            "192.168.1.20",
        ]);

        let cfg = cli.into_host_config().unwrap();

        assert_eq!(cfg.bind_addr, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(cfg.pin, "4321");
        assert_eq!(
            cfg.connection_url().unwrap(),
            "ws://192.168.1.20:9001?pin=4321"
        );
    }

    #[test]
    fn test_missing_pin_generates_four_digits() {
        let cli = Cli::parse_from(["relay-host", "--bind", "127.0.0.1"]);

        let cfg = cli.into_host_config().unwrap();

        assert_eq!(cfg.pin.len(), 4);
        assert!(cfg.pin.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(cfg.advertise_host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        let cli = Cli::parse_from(["relay-host", "--bind", "not-an-ip"]);
        assert!(cli.into_host_config().is_err());
    }

    #[test]
    fn test_overlong_pin_is_rejected() {
        let cli = Cli::parse_from(["relay-host", "--bind", "127.0.0.1", "--pin", "123456"]);
        assert!(cli.into_host_config().is_err());
    }
}
