//! Transport seam between the connection manager and the WebSocket stack.
//!
//! A [`Connector`] splits opening a channel into two parts. Construction is
//! synchronous and fails only for an endpoint that can never work. The
//! returned [`Handshake`] resolves asynchronously to a [`Channel`].

use std::fmt;
use std::pin::Pin;

use futures_util::future::{self, BoxFuture};
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::error::ClientError;

/// Close code for an orderly shutdown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported for a close frame without a status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Text-level frame exchanged over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 payload.
    Text(String),
    /// Close handshake.
    Close {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
}

impl Frame {
    /// Converts into a tungstenite message.
    #[must_use]
    pub fn into_message(self) -> Message {
        match self {
            Self::Text(text) => Message::text(text),
            Self::Close { code, reason } => Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.into(),
            })),
        }
    }

    /// Converts a tungstenite read result, dropping control and binary
    /// frames.
    #[must_use]
    pub fn from_message(item: Result<Message, tungstenite::Error>) -> Option<Result<Self, ClientError>> {
        match item {
            Ok(Message::Text(text)) => Some(Ok(Self::Text(text.as_str().to_owned()))),
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame.map_or((NO_STATUS_RECEIVED, String::new()), |f| {
                    (u16::from(f.code), f.reason.as_str().to_owned())
                });
                Some(Ok(Self::Close { code, reason }))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Write half of an open channel.
pub type FrameSink = Pin<Box<dyn Sink<Frame, Error = ClientError> + Send>>;

/// Read half of an open channel.
pub type FrameStream = BoxStream<'static, Result<Frame, ClientError>>;

/// Pending channel open.
pub type Handshake = BoxFuture<'static, Result<Channel, ClientError>>;

/// An open duplex channel.
pub struct Channel {
    /// Outbound frames.
    pub sink: FrameSink,
    /// Inbound frames.
    pub stream: FrameStream,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").finish_non_exhaustive()
    }
}

/// Opens channels to an endpoint.
pub trait Connector: Send + 'static {
    /// Constructs a channel to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEndpoint`] when no channel can ever be
    /// built for `url`. Network failures surface from the returned
    /// [`Handshake`] instead.
    fn connect(&self, url: &str) -> Result<Handshake, ClientError>;
}

/// Production connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl Connector for TungsteniteConnector {
    fn connect(&self, url: &str) -> Result<Handshake, ClientError> {
        let invalid = |reason: String| ClientError::InvalidEndpoint {
            url: url.to_string(),
            reason,
        };
        let request = url.into_client_request().map_err(|e| invalid(e.to_string()))?;
        match request.uri().scheme_str() {
            Some("ws" | "wss") => {}
            other => {
                return Err(invalid(format!(
                    "unsupported scheme {}",
                    other.unwrap_or("<none>")
                )));
            }
        }
        if request.uri().host().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(async move {
            let (socket, _response) = tokio_tungstenite::connect_async(request).await?;
            let (sink, stream) = socket.split();
            let sink: FrameSink = Box::pin(
                sink.sink_map_err(ClientError::from)
                    .with(|frame: Frame| future::ready(Ok::<_, ClientError>(frame.into_message()))),
            );
            let stream = stream
                .filter_map(|item| future::ready(Frame::from_message(item)))
                .boxed();
            Ok(Channel { sink, stream })
        }
        .boxed())
    }
}
