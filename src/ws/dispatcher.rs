//! Inbound message dispatch and the timed workflow presentation.
//!
//! [`MessageDispatcher`] classifies inbound frames by sender. A crew reply
//! received at `t0` schedules three steps at `t0 + 1`, `t0 + 2` and
//! `t0 + 3` phase intervals; the last one renders the reply. Steps are
//! kept in a deadline-ordered queue that the connection task drains.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use super::messages::{InboundEnvelope, Sender};
use crate::domain::PhaseStep;
use crate::ui::{ChatUi, show_stage};

#[derive(Debug)]
struct ScheduledStep {
    due: Instant,
    step: PhaseStep,
    reply: Option<String>,
}

/// Classifies inbound envelopes and paces crew replies.
#[derive(Debug)]
pub struct MessageDispatcher {
    interval: Duration,
    pending: VecDeque<ScheduledStep>,
}

impl MessageDispatcher {
    /// Creates a dispatcher whose steps are `interval` apart.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: VecDeque::new(),
        }
    }

    /// Handles a raw text frame received at `now`.
    ///
    /// A frame that is not a valid envelope produces exactly one system
    /// notice and nothing else.
    pub fn on_message<U: ChatUi + ?Sized>(&mut self, raw: &str, now: Instant, ui: &mut U) {
        match InboundEnvelope::parse(raw) {
            Ok(envelope) => self.dispatch(envelope, now),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed inbound frame");
                ui.render_system_notice(&e.notice());
            }
        }
    }

    /// Routes a parsed envelope received at `now`.
    pub fn dispatch(&mut self, envelope: InboundEnvelope, now: Instant) {
        let InboundEnvelope {
            sender,
            message,
            kind,
        } = envelope;
        match sender {
            Sender::Crew => {
                tracing::debug!(?kind, "crew reply received");
                self.schedule_reply(message, now);
            }
            Sender::System => {
                tracing::debug!(?kind, %message, "backend notice ignored");
            }
            Sender::Unknown(other) => {
                tracing::debug!(sender = %other, ?kind, "ignoring frame from unhandled sender");
            }
        }
    }

    /// Cancels every scheduled step. Returns how many were dropped.
    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled in-flight workflow steps");
        }
        cancelled
    }

    /// Deadline of the earliest scheduled step.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|s| s.due)
    }

    /// Number of scheduled steps.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Applies every step due at or before `now`, in deadline order.
    /// Returns how many fired.
    pub fn fire_due<U: ChatUi + ?Sized>(&mut self, now: Instant, ui: &mut U) -> usize {
        let mut fired = 0;
        while self.pending.front().is_some_and(|s| s.due <= now) {
            let Some(scheduled) = self.pending.pop_front() else {
                break;
            };
            for &(stage, visual) in scheduled.step.transitions() {
                show_stage(ui, stage, visual);
            }
            if let Some(reply) = scheduled.reply {
                ui.render_agent_message(&reply);
            }
            fired += 1;
        }
        fired
    }

    fn schedule_reply(&mut self, message: String, received_at: Instant) {
        let mut reply = Some(message);
        for step in PhaseStep::SEQUENCE {
            let scheduled = ScheduledStep {
                due: received_at + step.offset(self.interval),
                step,
                reply: if step.renders_reply() {
                    reply.take()
                } else {
                    None
                },
            };
            let idx = self.pending.partition_point(|s| s.due <= scheduled.due);
            self.pending.insert(idx, scheduled);
        }
    }
}
