//! Single-flight tool invocation over an exclusively owned session state.

use shared::{
    domain::ToolId,
    protocol::{SequenceStats, TransformResult},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    gateway::GatewayError,
    generation::{Generation, GenerationCounter},
};

pub const SEQUENCE_REQUIRED_MESSAGE: &str = "sequence required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvocationPhase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvocationRejected {
    #[error("sequence required")]
    EmptySequence,
    #[error("an invocation is already in flight")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationTicket {
    pub tool: ToolId,
    pub token: Generation,
}

#[derive(Debug, Default)]
pub struct SessionState {
    sequence: String,
    result: String,
    stats: Option<SequenceStats>,
    error: String,
    phase: InvocationPhase,
    failures: u64,
    tokens: GenerationCounter,
}

impl SessionState {
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn stats(&self) -> Option<&SequenceStats> {
        self.stats.as_ref()
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn phase(&self) -> InvocationPhase {
        self.phase
    }

    /// Bumped on every surfaced error, including repeats of the same text.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn loading(&self) -> bool {
        self.phase == InvocationPhase::Loading
    }

    /// Returns `true` when the text actually changed.
    pub fn set_sequence(&mut self, sequence: impl Into<String>) -> bool {
        let sequence = sequence.into();
        if sequence == self.sequence {
            return false;
        }
        self.sequence = sequence;
        true
    }

    pub fn begin_invocation(&mut self, tool: ToolId) -> Result<InvocationTicket, InvocationRejected> {
        if self.loading() {
            return Err(InvocationRejected::Busy);
        }
        if self.sequence.trim().is_empty() {
            self.fail(SEQUENCE_REQUIRED_MESSAGE.to_string());
            return Err(InvocationRejected::EmptySequence);
        }

        self.phase = InvocationPhase::Loading;
        self.error.clear();
        Ok(InvocationTicket {
            tool,
            token: self.tokens.advance(),
        })
    }

    /// Applies a gateway outcome. Returns `false` when the ticket was
    /// invalidated by a reset and the outcome was discarded.
    pub fn complete_invocation(
        &mut self,
        ticket: InvocationTicket,
        outcome: Result<TransformResult, GatewayError>,
    ) -> bool {
        if !self.loading() || !self.tokens.is_current(ticket.token) {
            debug!(
                tool = %ticket.tool,
                token = ticket.token.value(),
                "discarding stale invocation outcome"
            );
            return false;
        }

        match outcome {
            Ok(TransformResult::Sequence(output)) => {
                self.result = output.result;
                self.error.clear();
                self.phase = InvocationPhase::Succeeded;
            }
            Ok(TransformResult::Statistics(stats)) => {
                self.stats = Some(stats);
                self.error.clear();
                self.phase = InvocationPhase::Succeeded;
            }
            Err(err) => {
                self.fail(err.user_message());
                self.phase = InvocationPhase::Failed;
            }
        }
        true
    }

    fn fail(&mut self, message: String) {
        self.error = message;
        self.failures += 1;
    }

    pub fn apply_stats(&mut self, stats: SequenceStats) {
        self.stats = Some(stats);
    }

    pub fn clear_stats(&mut self) {
        self.stats = None;
    }

    /// Back to idle with everything empty; in-flight outcomes become stale.
    pub fn clear_all(&mut self) {
        self.sequence.clear();
        self.result.clear();
        self.stats = None;
        self.error.clear();
        self.phase = InvocationPhase::Idle;
        self.tokens.invalidate();
    }
}

#[cfg(test)]
#[path = "tests/invocation_tests.rs"]
mod tests;
