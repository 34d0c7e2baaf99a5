//! Lifecycle state of the duplex channel.

use std::fmt;

/// Connection lifecycle state.
///
/// Exactly one value exists per connection manager. `Connected` holds if
/// and only if the underlying channel is open and usable for sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelState {
    /// A channel is being opened.
    Connecting,
    /// The channel is open.
    Connected,
    /// No usable channel.
    #[default]
    Disconnected,
}

impl ChannelState {
    /// Returns `true` if outbound frames may be transmitted.
    #[must_use]
    pub const fn can_send(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Short label for a status indicator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
