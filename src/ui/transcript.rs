//! In-memory chat transcript rendered as HTML fragments.
//!
//! [`Transcript`] is a complete [`ChatUi`]: it keeps every bubble with its
//! markup, the workflow indicator, the status indicator and the send
//! affordance, and can render the whole conversation as one HTML string.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::ChatUi;
use super::format::{escape_html, format_agent_message, format_user_message};
use crate::domain::{ChannelState, StageVisual, WorkflowStage};

/// Display name shown above crew replies.
const CREW_DISPLAY_NAME: &str = "Multi-Agent Crew";

/// Who produced a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Typed by the user.
    User,
    /// Reply from the agent crew.
    Agent,
    /// Notice produced by the client.
    System,
}

impl EntryKind {
    const fn css_class(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
        }
    }
}

/// One bubble in the chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Origin of the bubble.
    pub kind: EntryKind,
    /// Text as handed to the UI.
    pub text: String,
    /// Inner markup of the bubble.
    pub html: String,
    /// When the bubble was appended.
    pub at: DateTime<Utc>,
}

/// Status text and visual state of one workflow stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    /// Status text next to the stage.
    pub status: String,
    /// Visual state.
    pub visual: StageVisual,
}

impl Default for StageView {
    fn default() -> Self {
        Self {
            status: StageVisual::Idle.status_text().to_string(),
            visual: StageVisual::Idle,
        }
    }
}

/// Chat stream plus indicator state.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
    stages: HashMap<WorkflowStage, StageView>,
    connection: ChannelState,
    send_enabled: bool,
    inputs_cleared: usize,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All bubbles in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Texts of system notices in arrival order.
    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::System)
            .map(|e| e.text.as_str())
    }

    /// Current view of a stage; stages never touched are idle.
    #[must_use]
    pub fn stage(&self, stage: WorkflowStage) -> StageView {
        self.stages.get(&stage).cloned().unwrap_or_default()
    }

    /// Current status indicator.
    #[must_use]
    pub const fn connection_state(&self) -> ChannelState {
        self.connection
    }

    /// Whether the send affordance is enabled.
    #[must_use]
    pub const fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// How many times the input buffer was cleared.
    #[must_use]
    pub const fn inputs_cleared(&self) -> usize {
        self.inputs_cleared
    }

    /// Renders the whole chat stream as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let sender = match entry.kind {
                    EntryKind::Agent => {
                        format!("<div class=\"message-sender\">{CREW_DISPLAY_NAME}</div>")
                    }
                    EntryKind::User | EntryKind::System => String::new(),
                };
                format!(
                    "<div class=\"message {}\">{sender}<div class=\"message-content\">{}</div></div>",
                    entry.kind.css_class(),
                    entry.html
                )
            })
            .collect()
    }

    fn push(&mut self, kind: EntryKind, text: &str, html: String) {
        self.entries.push(ChatEntry {
            kind,
            text: text.to_string(),
            html,
            at: Utc::now(),
        });
    }
}

impl ChatUi for Transcript {
    fn render_user_message(&mut self, text: &str) {
        self.push(EntryKind::User, text, format_user_message(text));
    }

    fn render_agent_message(&mut self, text: &str) {
        self.push(EntryKind::Agent, text, format_agent_message(text));
    }

    fn render_system_notice(&mut self, text: &str) {
        self.push(EntryKind::System, text, format!("<p>{}</p>", escape_html(text)));
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn set_connection_state(&mut self, state: ChannelState) {
        self.connection = state;
    }

    fn set_workflow_status(&mut self, stage: WorkflowStage, status: &str) {
        self.stages.entry(stage).or_default().status = status.to_string();
    }

    fn set_workflow_visual_state(&mut self, stage: WorkflowStage, state: StageVisual) {
        self.stages.entry(stage).or_default().visual = state;
    }

    fn clear_input_buffer(&mut self) {
        self.inputs_cleared += 1;
    }
}
