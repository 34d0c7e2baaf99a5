//! Channel layer: envelopes, transport, connection lifecycle, dispatch.
//!
//! The connection manager owns one duplex channel to the crew backend,
//! reconnects it with bounded backoff, and hands inbound frames to the
//! message dispatcher.

pub mod connection;
pub mod dispatcher;
pub mod handle;
pub mod messages;
pub mod transport;

pub use connection::{ConnectionManager, ConnectionStatus};
pub use dispatcher::MessageDispatcher;
pub use handle::{ClientHandle, Command, spawn};
pub use messages::{InboundEnvelope, MessageKind, OutboundEnvelope, Sender};
pub use transport::{Channel, Connector, Frame, FrameSink, FrameStream, Handshake, TungsteniteConnector};
