//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every numeric knob falls back to the
//! built-in default when unset or unparsable.

use std::time::Duration;

use crate::domain::ReconnectPolicy;
use crate::error::ClientError;

/// Default channel endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Address of the duplex channel (e.g. `ws://localhost:8000/ws`).
    pub ws_url: String,

    /// Ceiling for the retry counter.
    pub max_reconnect_attempts: u32,

    /// Backoff step in milliseconds; the n-th retry waits `n * step`.
    pub reconnect_step_ms: u64,

    /// Upper bound on any single backoff delay, in milliseconds.
    pub reconnect_max_delay_ms: u64,

    /// Spacing between the workflow phase steps, in milliseconds.
    pub phase_interval_ms: u64,

    /// Capacity of the command queue feeding the connection task.
    pub command_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            max_reconnect_attempts: 5,
            reconnect_step_ms: 2_000,
            reconnect_max_delay_ms: 10_000,
            phase_interval_ms: 1_000,
            command_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `CREW_WS_URL` is set to an empty
    /// string.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let ws_url = std::env::var("CREW_WS_URL").unwrap_or(defaults.ws_url);
        if ws_url.trim().is_empty() {
            return Err(ClientError::Config("CREW_WS_URL is empty".to_string()));
        }

        Ok(Self {
            ws_url,
            max_reconnect_attempts: parse_env(
                "CREW_MAX_RECONNECT_ATTEMPTS",
                defaults.max_reconnect_attempts,
            ),
            reconnect_step_ms: parse_env("CREW_RECONNECT_STEP_MS", defaults.reconnect_step_ms),
            reconnect_max_delay_ms: parse_env(
                "CREW_RECONNECT_MAX_DELAY_MS",
                defaults.reconnect_max_delay_ms,
            ),
            phase_interval_ms: parse_env("CREW_PHASE_INTERVAL_MS", defaults.phase_interval_ms),
            command_capacity: parse_env("CREW_COMMAND_CAPACITY", defaults.command_capacity).max(1),
        })
    }

    /// Builds the reconnect policy described by this configuration.
    #[must_use]
    pub const fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.max_reconnect_attempts,
            Duration::from_millis(self.reconnect_step_ms),
            Duration::from_millis(self.reconnect_max_delay_ms),
        )
    }

    /// Returns the spacing between workflow phase steps.
    #[must_use]
    pub const fn phase_interval(&self) -> Duration {
        Duration::from_millis(self.phase_interval_ms)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
