//! Collection node — one model call per user turn, additive merge.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, LlmError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::{collection_system_prompt, collection_user_prompt, parse_collection_response};
use super::state::{Branch, IntakeSession};

/// Collection node.
///
/// Sends the latest user message through the record contract, merges the
/// fields the model heard into the session profile, and branches on the
/// model's completeness flag. No retries: a failed call or an unparseable
/// response propagates to the caller.
pub struct Collector {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl Collector {
    pub fn new(llm: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            llm,
            temperature,
            max_tokens,
        }
    }

    /// Run one collection turn against the session.
    pub async fn collect(&self, session: &mut IntakeSession) -> Result<Branch, Error> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(collection_system_prompt()),
            ChatMessage::user(collection_user_prompt(&session.input)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;

        let record = parse_collection_response(&response.content).map_err(|e| {
            warn!(
                raw_response = %response.content,
                error = %e,
                "Failed to parse collection response"
            );
            LlmError::InvalidResponse {
                provider: self.llm.model_name().to_string(),
                reason: e,
            }
        })?;

        session.profile.merge_record(&record);
        session.messages.push(ChatMessage::assistant(&response.content));

        debug!(
            session = %session.id,
            missing = session.profile.missing_fields().len(),
            collected = record.is_data_collected,
            "Collection turn complete"
        );

        Ok(if record.is_data_collected {
            Branch::Done
        } else {
            Branch::MoreInfo
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::profile::{Gender, RentType};
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
                input_tokens: 100,
                output_tokens: 50,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn collector_with(response: &str) -> Collector {
        Collector::new(
            Arc::new(StubLlm {
                response: response.to_string(),
            }),
            0.0,
            1024,
        )
    }

    #[tokio::test]
    async fn incomplete_record_branches_more_info() {
        let collector =
            collector_with(r#"{"age": 30, "gender": "male", "is_data_collected": false}"#);
        let mut session = IntakeSession::new();
        session.push_input("I'm a 30 year old man");

        let branch = collector.collect(&mut session).await.unwrap();

        assert_eq!(branch, Branch::MoreInfo);
        // Exactly the returned fields were written
        assert_eq!(session.profile.age, Some(30));
        assert_eq!(session.profile.gender, Some(Gender::Male));
        assert_eq!(session.profile.district, None);
        assert_eq!(session.profile.income, None);
    }

    #[tokio::test]
    async fn turn_preserves_previously_collected_fields() {
        let collector = collector_with(r#"{"income": 50000000, "is_data_collected": false}"#);
        let mut session = IntakeSession::new();
        session.profile.age = Some(30);
        session.push_input("I make 50 million a year");

        collector.collect(&mut session).await.unwrap();

        assert_eq!(session.profile.age, Some(30));
        assert_eq!(session.profile.income, Some(50_000_000));
    }

    #[tokio::test]
    async fn complete_record_branches_done() {
        let collector = collector_with(
            r#"{"age": 29, "gender": "female", "district": "서울특별시 강남구",
                "married": true, "marriage_date": "2022-01-01", "income": 48000000,
                "asset": 120000000, "has_car": true, "car_value": 15000000,
                "budget": 200000000, "house_size": 84, "price_limit": 300000000,
                "rent_type": "전세", "is_data_collected": true}"#,
        );
        let mut session = IntakeSession::new();
        session.push_input("(everything at once)");

        let branch = collector.collect(&mut session).await.unwrap();

        assert_eq!(branch, Branch::Done);
        assert!(session.profile.missing_fields().is_empty());
        assert_eq!(session.profile.age, Some(29));
        assert_eq!(session.profile.rent_type, Some(RentType::Jeonse));
        assert_eq!(session.profile.marriage_date.as_deref(), Some("2022-01-01"));
    }

    #[tokio::test]
    async fn unparseable_response_propagates() {
        let collector = collector_with("Sorry, I didn't catch that.");
        let mut session = IntakeSession::new();
        session.push_input("???");

        let err = collector.collect(&mut session).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Llm(LlmError::InvalidResponse { .. })
        ));
        // Nothing was merged
        assert_eq!(session.profile, Default::default());
    }

    #[tokio::test]
    async fn assistant_turn_is_logged() {
        let collector = collector_with(r#"{"is_data_collected": false}"#);
        let mut session = IntakeSession::new();
        session.push_input("hello");

        collector.collect(&mut session).await.unwrap();

        // user turn + assistant turn
        assert_eq!(session.messages.len(), 2);
        assert_eq!(
            session.messages[1].role,
            crate::llm::Role::Assistant
        );
    }
}
