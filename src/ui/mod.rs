//! UI collaborator seam.
//!
//! The connection manager owns no presentation state. It drives a
//! [`ChatUi`] implementation, which decides how bubbles, notices and the
//! workflow indicator are shown.

pub mod format;
pub mod transcript;

pub use transcript::{ChatEntry, EntryKind, StageView, Transcript};

use crate::domain::{ChannelState, StageVisual, WorkflowStage};

/// Presentation calls made by the connection manager.
///
/// Implementations must not block: every call happens on the connection
/// task between transport events.
pub trait ChatUi: Send + 'static {
    /// Shows a message typed by the user. `text` is raw and must be escaped
    /// before it reaches markup.
    fn render_user_message(&mut self, text: &str);

    /// Shows a reply from the agent crew. `text` comes from a trusted source.
    fn render_agent_message(&mut self, text: &str);

    /// Shows a system notice in the chat stream.
    fn render_system_notice(&mut self, text: &str);

    /// Enables or disables the send affordance.
    fn set_send_enabled(&mut self, enabled: bool);

    /// Updates the connection status indicator.
    fn set_connection_state(&mut self, state: ChannelState);

    /// Sets the status text of a workflow stage.
    fn set_workflow_status(&mut self, stage: WorkflowStage, status: &str);

    /// Sets the visual state of a workflow stage.
    fn set_workflow_visual_state(&mut self, stage: WorkflowStage, state: StageVisual);

    /// Clears the input buffer after a successful send.
    fn clear_input_buffer(&mut self);
}

/// Applies `visual` and its status text to `stage`.
pub(crate) fn show_stage<U: ChatUi + ?Sized>(ui: &mut U, stage: WorkflowStage, visual: StageVisual) {
    ui.set_workflow_status(stage, visual.status_text());
    ui.set_workflow_visual_state(stage, visual);
}

/// Puts every stage back to idle.
pub(crate) fn reset_workflow<U: ChatUi + ?Sized>(ui: &mut U) {
    for stage in WorkflowStage::ALL {
        show_stage(ui, stage, StageVisual::Idle);
    }
}
