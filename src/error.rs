//! Client error types with notice-text mapping.
//!
//! [`ClientError`] is the central error type for the client. No operation
//! of the connection manager returns it to a caller; every variant is
//! rendered into the chat stream as a system notice via
//! [`ClientError::notice`].

use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// Client-side error enum with user-visible notice mapping.
///
/// # Categories
///
/// | Variant                 | Retried by backoff | Surface              |
/// |-------------------------|--------------------|----------------------|
/// | `InvalidEndpoint`       | no                 | notice               |
/// | `UnexpectedClose`       | yes                | notice with delay    |
/// | `RetryExhausted`        | no (terminal)      | notice               |
/// | `MalformedPayload`      | n/a                | notice               |
/// | `SendWhileDisconnected` | recovery connect   | notice               |
/// | `SendFailed`            | no                 | notice               |
/// | `Transport`             | via close event    | log only             |
/// | `Config`                | no                 | startup failure      |
/// | `Stopped`               | no                 | handle call result   |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The channel could not be constructed for the configured endpoint.
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint {
        /// Endpoint that was rejected.
        url: String,
        /// Why the endpoint was rejected.
        reason: String,
    },

    /// The channel closed without being asked to.
    #[error("channel closed unexpectedly (code {code}): {reason}")]
    UnexpectedClose {
        /// Close code reported by the transport.
        code: u16,
        /// Close reason reported by the transport.
        reason: String,
    },

    /// The retry counter reached its ceiling.
    #[error("gave up reconnecting after {attempts} attempts")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// An inbound frame was not a valid envelope.
    #[error("malformed inbound payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A send was requested while the channel was not connected.
    #[error("cannot send while disconnected")]
    SendWhileDisconnected,

    /// The transport rejected an outbound frame.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Error reported by the WebSocket transport.
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The connection task is no longer running.
    #[error("connection task stopped")]
    Stopped,
}

impl ClientError {
    /// Returns the notice rendered into the chat stream for this error.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::InvalidEndpoint { .. } => {
                "Error while creating the connection to the server.".to_string()
            }
            Self::UnexpectedClose { .. } => "Disconnected from the server.".to_string(),
            Self::RetryExhausted { .. } => "Unable to reach the server after several attempts. \
                 Please reload the page or check that the server is online."
                .to_string(),
            Self::MalformedPayload(_) => "Error while processing a received message.".to_string(),
            Self::SendWhileDisconnected => "Unable to send the message. The connection is closed. \
                 Attempting to reconnect..."
                .to_string(),
            Self::SendFailed(_) => "Error while sending the message. Please try again.".to_string(),
            Self::Transport(_) => "Connection error.".to_string(),
            Self::Config(reason) => format!("Configuration error: {reason}"),
            Self::Stopped => "The client has stopped.".to_string(),
        }
    }

    /// Returns `true` if the reconnect policy applies to this error.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::UnexpectedClose { .. } | Self::Transport(_))
    }

    /// Formats the notice announcing a reconnect scheduled after this
    /// error.
    #[must_use]
    pub fn reconnect_notice(&self, delay: Duration, attempt: u32, ceiling: u32) -> String {
        let secs = delay.as_secs_f64();
        format!(
            "{} Reconnecting in {secs} seconds... ({attempt}/{ceiling})",
            self.notice()
        )
    }
}
