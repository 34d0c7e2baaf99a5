//! # crew-link
//!
//! Self-healing client for the duplex channel between a chat interface and
//! a multi-agent crew backend.
//!
//! The crate keeps one WebSocket channel open, reconnects it with bounded
//! backoff when it drops, serializes outbound user messages, and paces crew
//! replies through a three-stage workflow indicator. Presentation is
//! delegated to a [`ui::ChatUi`] implementation.
//!
//! ## Architecture
//!
//! ```text
//! ClientHandle (commands)
//!     │
//!     ├── ConnectionManager (ws/connection)
//!     │       ├── ReconnectPolicy / RetryCounter (domain/)
//!     │       ├── Connector → Channel (ws/transport)
//!     │       └── MessageDispatcher (ws/dispatcher)
//!     │
//!     └── ChatUi (ui/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ui;
pub mod ws;
