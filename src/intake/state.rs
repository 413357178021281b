//! Session state and the intake phase machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IntakeError;
use crate::llm::ChatMessage;

use super::profile::ApplicantProfile;

/// The phases of an intake conversation.
///
/// Progresses linearly: Collecting → Reviewing → Complete. Each
/// non-terminal phase re-enters itself until its node reports done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePhase {
    Collecting,
    Reviewing,
    Complete,
}

impl IntakePhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakePhase) -> bool {
        use IntakePhase::*;
        matches!((self, target), (Collecting, Reviewing) | (Reviewing, Complete))
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<IntakePhase> {
        match self {
            Self::Collecting => Some(Self::Reviewing),
            Self::Reviewing => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Whether this phase is terminal (the conversation is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for IntakePhase {
    fn default() -> Self {
        Self::Collecting
    }
}

impl std::fmt::Display for IntakePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::Reviewing => "reviewing",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Branch signal returned by each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// The node needs another user turn.
    MoreInfo,
    /// The node is finished; the phase machine may advance.
    Done,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoreInfo => write!(f, "more_info"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// In-memory state for one conversation.
///
/// Created empty at conversation start, mutated in place by each node
/// call, discarded when the conversation ends. Nodes run strictly
/// sequentially per session; concurrent conversations each own their own
/// instance.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    pub id: Uuid,
    pub phase: IntakePhase,
    /// The latest raw user message.
    pub input: String,
    /// Append-only, order-preserving log of conversation turns.
    pub messages: Vec<ChatMessage>,
    pub profile: ApplicantProfile,
    pub started_at: DateTime<Utc>,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: IntakePhase::default(),
            input: String::new(),
            messages: Vec::new(),
            profile: ApplicantProfile::default(),
            started_at: Utc::now(),
        }
    }

    /// Record the latest user turn: appended to the message log, and
    /// replaces `input` for the next node call.
    pub fn push_input(&mut self, input: impl Into<String>) {
        let input = input.into();
        self.messages.push(ChatMessage::user(&input));
        self.input = input;
    }

    /// Advance the phase machine. Errors if already at the terminal phase.
    pub fn advance(&mut self) -> Result<IntakePhase, IntakeError> {
        let next = self.phase.next().ok_or(IntakeError::SessionComplete)?;
        if !self.phase.can_transition_to(next) {
            return Err(IntakeError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(next)
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use IntakePhase::*;
        assert!(Collecting.can_transition_to(Reviewing));
        assert!(Reviewing.can_transition_to(Complete));
    }

    #[test]
    fn invalid_transitions() {
        use IntakePhase::*;
        // Skip a phase
        assert!(!Collecting.can_transition_to(Complete));
        // Go backward
        assert!(!Reviewing.can_transition_to(Collecting));
        assert!(!Complete.can_transition_to(Collecting));
        // Self-transition
        assert!(!Collecting.can_transition_to(Collecting));
    }

    #[test]
    fn is_terminal() {
        assert!(IntakePhase::Complete.is_terminal());
        assert!(!IntakePhase::Collecting.is_terminal());
        assert!(!IntakePhase::Reviewing.is_terminal());
    }

    #[test]
    fn advance_walks_all_phases() {
        let mut session = IntakeSession::new();
        assert_eq!(session.phase, IntakePhase::Collecting);
        assert_eq!(session.advance().unwrap(), IntakePhase::Reviewing);
        assert_eq!(session.advance().unwrap(), IntakePhase::Complete);
        assert!(session.advance().is_err());
    }

    #[test]
    fn push_input_appends_to_log() {
        let mut session = IntakeSession::new();
        session.push_input("I'm 30 years old");
        session.push_input("I live in Gangnam");

        assert_eq!(session.input, "I live in Gangnam");
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "I'm 30 years old");
    }

    #[test]
    fn display_matches_serde() {
        for phase in [
            IntakePhase::Collecting,
            IntakePhase::Reviewing,
            IntakePhase::Complete,
        ] {
            let display = format!("{phase}");
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn branch_display() {
        assert_eq!(Branch::MoreInfo.to_string(), "more_info");
        assert_eq!(Branch::Done.to_string(), "done");
    }
}
