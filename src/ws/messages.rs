//! Channel message types: outbound and inbound envelopes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Frame sent for every user-initiated send: `{"message": "..."}`.
///
/// Built fresh per send and dropped after transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    /// User text.
    pub message: String,
}

impl OutboundEnvelope {
    /// Wraps user text.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Serializes the envelope to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedPayload`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ClientError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Origin of an inbound envelope.
///
/// Only [`Sender::Crew`] is acted upon. New senders land in
/// [`Sender::Unknown`] so the dispatcher has to decide about them
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Sender {
    /// The multi-agent crew.
    Crew,
    /// The backend itself (connection, ack and error frames).
    System,
    /// Any other sender value.
    Unknown(String),
}

impl From<String> for Sender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "crew" => Self::Crew,
            "system" => Self::System,
            _ => Self::Unknown(value),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crew => f.write_str("crew"),
            Self::System => f.write_str("system"),
            Self::Unknown(other) => f.write_str(other),
        }
    }
}

/// Optional `type` discriminator the backend attaches to its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Greeting sent right after the channel opens.
    Connection,
    /// Receipt of a user message.
    Ack,
    /// Backend-side failure.
    Error,
    /// Crew reply.
    Response,
    /// Any other value.
    #[serde(other)]
    Other,
}

/// Frame received from the backend: `{"sender": "...", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundEnvelope {
    /// Origin of the frame.
    pub sender: Sender,
    /// Message body.
    pub message: String,
    /// Optional frame kind.
    #[serde(rename = "type", default)]
    pub kind: Option<MessageKind>,
}

impl InboundEnvelope {
    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MalformedPayload`] if `raw` is not JSON or
    /// lacks `sender` / `message` strings.
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(raw)?)
    }
}
