//! LLM integration for the intake agent.
//!
//! Supports:
//! - **OpenAI**: Chat Completions API via direct REST
//! - **Anthropic**: Messages API via direct REST
//!
//! Both backends implement the `LlmProvider` trait; the rest of the crate
//! never sees which one is configured.

mod anthropic;
mod openai;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::Deserialize;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Anthropic,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    match config.backend {
        LlmBackend::OpenAi => {
            tracing::info!("Using OpenAI (model: {})", config.model);
            Arc::new(OpenAiProvider::new(
                config.api_key.clone(),
                config.model.clone(),
            ))
        }
        LlmBackend::Anthropic => {
            tracing::info!("Using Anthropic (model: {})", config.model);
            Arc::new(AnthropicProvider::new(
                config.api_key.clone(),
                config.model.clone(),
            ))
        }
    }
}

/// Error body shape shared by both provider APIs.
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a non-success HTTP response to an `LlmError`.
pub(crate) fn map_http_error(
    provider: &str,
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
            provider: provider.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            provider: provider.to_string(),
            retry_after,
        },
        _ => LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: format!("{status}: {message}"),
        },
    }
}

/// Parse a Retry-After header given in seconds.
pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.parse::<u64>().ok().map(Duration::from_secs)
}
