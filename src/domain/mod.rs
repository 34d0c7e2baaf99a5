//! Domain layer: channel state, reconnect policy, and workflow stages.
//!
//! These types carry no I/O. The connection manager in [`crate::ws`]
//! drives them from transport events and timers.

pub mod backoff;
pub mod channel_state;
pub mod workflow;

pub use backoff::{ReconnectPolicy, RetryCounter};
pub use channel_state::ChannelState;
pub use workflow::{PhaseStep, StageVisual, WorkflowStage};
