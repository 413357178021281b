//! Review node — turns correction text into an ordered change list.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, LlmError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::{parse_review_response, review_system_prompt, review_user_prompt};
use super::state::{Branch, IntakeSession};

/// Review node.
///
/// Asks the model for a change list, applies the entries to the profile in
/// sequence order (a later entry wins over an earlier one for the same
/// field), and branches on the model's finished flag. Same no-retry,
/// propagate-on-failure policy as the collection node.
pub struct Reviewer {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Reviewer {
    pub fn new(llm: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            llm,
            temperature,
            max_tokens,
        }
    }

    /// Run one review turn against the session.
    pub async fn review(&self, session: &mut IntakeSession) -> Result<Branch, Error> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(review_system_prompt()),
            ChatMessage::user(review_user_prompt(&session.input)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;

        let changes = parse_review_response(&response.content).map_err(|e| {
            warn!(
                raw_response = %response.content,
                error = %e,
                "Failed to parse review response"
            );
            LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: e,
            }
        })?;

        for change in &changes.change_column_list {
            for (field, value) in change {
                session.profile.apply_change(field, value)?;
            }
        }
        session.messages.push(ChatMessage::assistant(&response.content));

        debug!(
            session = %session.id,
            changes = changes.change_column_list.len(),
            done = changes.is_done,
            "Review turn complete"
        );

        Ok(if changes.is_done {
            Branch::Done
        } else {
            Branch::MoreInfo
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntakeError;
    use crate::intake::profile::ApplicantProfile;
    use crate::llm::{CompletionResponse, FinishReason};

    /// Stub provider that returns a fixed response.
    struct StubLlm {
        response: String,
    }

    #[async_trait::async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.response.clone(),
                input_tokens: 80,
                output_tokens: 30,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn reviewer_with(response: &str) -> Reviewer {
        Reviewer::new(
            Arc::new(StubLlm {
                response: response.to_string(),
            }),
            0.0,
            1024,
        )
    }

    #[tokio::test]
    async fn duplicate_fields_are_last_write_wins() {
        let reviewer = reviewer_with(
            r#"{"change_column_list": [{"age": 30}, {"age": 31}], "is_done": false}"#,
        );
        let mut session = IntakeSession::new();
        session.push_input("my age is wrong");

        let branch = reviewer.review(&mut session).await.unwrap();

        assert_eq!(branch, Branch::MoreInfo);
        assert_eq!(session.profile.age, Some(31));
    }

    #[tokio::test]
    async fn empty_change_list_mutates_nothing() {
        let reviewer = reviewer_with(r#"{"change_column_list": [], "is_done": false}"#);
        let mut session = IntakeSession::new();
        session.profile.age = Some(40);
        let before = session.profile.clone();
        session.push_input("looks fine so far");

        let branch = reviewer.review(&mut session).await.unwrap();

        assert_eq!(branch, Branch::MoreInfo);
        assert_eq!(session.profile, before);
    }

    #[tokio::test]
    async fn done_flag_wins_regardless_of_changes() {
        let reviewer = reviewer_with(
            r#"{"change_column_list": [{"budget": 250000000}], "is_done": true}"#,
        );
        let mut session = IntakeSession::new();
        session.push_input("set my budget to 250 million, that's everything");

        let branch = reviewer.review(&mut session).await.unwrap();

        assert_eq!(branch, Branch::Done);
        // Changes are still applied on the final turn
        assert_eq!(session.profile.budget, Some(250_000_000));
    }

    #[tokio::test]
    async fn unmarrying_does_not_clear_marriage_date() {
        let mut session = IntakeSession::new();
        session.profile = ApplicantProfile {
            married: Some(true),
            marriage_date: Some("2022-01-01".to_string()),
            ..Default::default()
        };

        let reviewer = reviewer_with(
            r#"{"change_column_list": [{"married": false}], "is_done": false}"#,
        );
        session.push_input("actually I'm not married");
        reviewer.review(&mut session).await.unwrap();

        assert_eq!(session.profile.married, Some(false));
        assert_eq!(session.profile.marriage_date.as_deref(), Some("2022-01-01"));
    }

    #[tokio::test]
    async fn unknown_field_propagates() {
        let reviewer = reviewer_with(
            r#"{"change_column_list": [{"shoe_size": 270}], "is_done": false}"#,
        );
        let mut session = IntakeSession::new();
        session.push_input("my shoe size is 270");

        let err = reviewer.review(&mut session).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Intake(IntakeError::UnknownField { .. })
        ));
    }

    #[tokio::test]
    async fn unparseable_response_propagates() {
        let reviewer = reviewer_with("Understood, I've made the change.");
        let mut session = IntakeSession::new();
        session.push_input("change my district");

        let err = reviewer.review(&mut session).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Llm(LlmError::InvalidResponse { .. })
        ));
    }
}
