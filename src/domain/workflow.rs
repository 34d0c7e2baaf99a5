//! Three-stage workflow indicator.
//!
//! The stages are simulated on the client for pacing only; they carry no
//! backend state. A crew reply walks them through [`PhaseStep::SEQUENCE`],
//! one step per phase interval.

use std::fmt;
use std::time::Duration;

/// One of the three named workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStage {
    /// Information gathering.
    Research,
    /// Insight extraction.
    Analysis,
    /// Response composition.
    Writing,
}

impl WorkflowStage {
    /// All stages in display order.
    pub const ALL: [Self; 3] = [Self::Research, Self::Analysis, Self::Writing];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Writing => "writing",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual state of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StageVisual {
    /// Not started.
    #[default]
    Idle,
    /// In progress.
    Active,
    /// Done.
    Completed,
}

impl StageVisual {
    /// Status text shown next to a stage in this visual state.
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::Idle => "Pending",
            Self::Active => "In progress",
            Self::Completed => "Completed",
        }
    }
}

/// A timed step of the presentation sequence for a crew reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseStep {
    /// Research completed, analysis active.
    ResearchDone,
    /// Analysis completed, writing active.
    AnalysisDone,
    /// Writing completed; the reply is rendered.
    WritingDone,
}

impl PhaseStep {
    /// Steps in firing order.
    pub const SEQUENCE: [Self; 3] = [Self::ResearchDone, Self::AnalysisDone, Self::WritingDone];

    /// Offset of this step from the receipt of the reply.
    #[must_use]
    pub fn offset(self, interval: Duration) -> Duration {
        let slot: u32 = match self {
            Self::ResearchDone => 1,
            Self::AnalysisDone => 2,
            Self::WritingDone => 3,
        };
        interval.saturating_mul(slot)
    }

    /// Stage updates applied when this step fires, in order.
    #[must_use]
    pub const fn transitions(self) -> &'static [(WorkflowStage, StageVisual)] {
        match self {
            Self::ResearchDone => &[
                (WorkflowStage::Research, StageVisual::Completed),
                (WorkflowStage::Analysis, StageVisual::Active),
            ],
            Self::AnalysisDone => &[
                (WorkflowStage::Analysis, StageVisual::Completed),
                (WorkflowStage::Writing, StageVisual::Active),
            ],
            Self::WritingDone => &[(WorkflowStage::Writing, StageVisual::Completed)],
        }
    }

    /// Returns `true` for the step that renders the reply.
    #[must_use]
    pub const fn renders_reply(self) -> bool {
        matches!(self, Self::WritingDone)
    }
}
