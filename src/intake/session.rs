//! Session driver — runs one node per conversational turn.

use std::sync::Arc;

use tracing::info;

use crate::config::IntakeConfig;
use crate::error::{Error, IntakeError};
use crate::llm::LlmProvider;

use super::collector::Collector;
use super::reviewer::Reviewer;
use super::state::{Branch, IntakePhase, IntakeSession};

/// Outcome of a single conversational turn.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Phase after the turn (already advanced when the node reported done).
    pub phase: IntakePhase,
    /// Branch signal the node returned.
    pub branch: Branch,
    /// Wire names of the fields still unset after the turn.
    pub missing: Vec<&'static str>,
}

/// Drives one conversation through the two-node workflow.
///
/// The whole graph: the collection node self-loops until its completeness
/// flag is set, hands off to the review node, which self-loops until the
/// user is done. Strictly sequential — one blocking model call per turn.
pub struct IntakeRunner {
    collector: Collector,
    reviewer: Reviewer,
}

impl IntakeRunner {
    pub fn new(llm: Arc<dyn LlmProvider>, config: &IntakeConfig) -> Self {
        Self {
            collector: Collector::new(llm.clone(), config.temperature, config.max_tokens),
            reviewer: Reviewer::new(llm, config.temperature, config.max_tokens),
        }
    }

    /// Run one turn: record the input, call the current phase's node, and
    /// advance the phase machine when the node reports done.
    pub async fn step(
        &self,
        session: &mut IntakeSession,
        input: &str,
    ) -> Result<StepOutcome, Error> {
        if session.phase.is_terminal() {
            return Err(IntakeError::SessionComplete.into());
        }
        session.push_input(input);

        let branch = match session.phase {
            IntakePhase::Collecting => self.collector.collect(session).await?,
            IntakePhase::Reviewing => self.reviewer.review(session).await?,
            IntakePhase::Complete => return Err(IntakeError::SessionComplete.into()),
        };

        if branch == Branch::Done {
            let phase = session.advance()?;
            info!(session = %session.id, %phase, "Phase transition");
        }

        Ok(StepOutcome {
            phase: session.phase,
            branch,
            missing: session.profile.missing_fields(),
        })
    }
}
