//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with sensible defaults for local
//! development.

use std::net::SocketAddr;
use std::time::Duration;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Seconds between server-initiated WebSocket pings.
    pub ws_heartbeat_interval_secs: u64,

    /// Seconds of inbound silence after which a connection is forcibly
    /// unregistered.
    pub ws_idle_timeout_secs: u64,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let ws_heartbeat_interval_secs = parse_env("WS_HEARTBEAT_INTERVAL_SECS", 30);
        let ws_idle_timeout_secs = parse_env("WS_IDLE_TIMEOUT_SECS", 90);

        Ok(Self {
            listen_addr,
            ws_heartbeat_interval_secs,
            ws_idle_timeout_secs,
        })
    }

    /// Returns the keep-alive slice of the configuration, as handed to
    /// every connection task.
    #[must_use]
    pub const fn heartbeat(&self) -> HeartbeatSettings {
        HeartbeatSettings {
            interval: Duration::from_secs(self.ws_heartbeat_interval_secs),
            idle_timeout: Duration::from_secs(self.ws_idle_timeout_secs),
        }
    }
}

/// Keep-alive tuning shared with every WebSocket connection task.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatSettings {
    /// Interval between server-initiated pings.
    pub interval: Duration,
    /// Inbound silence after which the connection is dropped.
    pub idle_timeout: Duration,
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
