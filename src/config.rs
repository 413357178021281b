//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default model per backend. The OpenAI default matches the extraction
/// workload: small, cheap, schema-following.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

const DEFAULT_MAX_TOKENS: u32 = 1024;
// Extraction should be deterministic.
const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Intake agent configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub llm: LlmConfig,
    /// Max tokens per extraction call.
    pub max_tokens: u32,
    /// Sampling temperature for extraction calls.
    pub temperature: f32,
}

impl IntakeConfig {
    /// Load configuration from the environment.
    ///
    /// - `HOUSING_INTAKE_BACKEND`: `openai` (default) or `anthropic`
    /// - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`: required for the chosen backend
    /// - `HOUSING_INTAKE_MODEL`: overrides the backend default model
    /// - `HOUSING_INTAKE_MAX_TOKENS`, `HOUSING_INTAKE_TEMPERATURE`: call tuning
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("HOUSING_INTAKE_BACKEND").as_deref() {
            Err(_) | Ok("openai") => LlmBackend::OpenAi,
            Ok("anthropic") => LlmBackend::Anthropic,
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "HOUSING_INTAKE_BACKEND".to_string(),
                    message: format!("expected 'openai' or 'anthropic', got '{other}'"),
                });
            }
        };

        let key_var = api_key_var(backend);
        let api_key = std::env::var(key_var)
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = std::env::var("HOUSING_INTAKE_MODEL")
            .unwrap_or_else(|_| default_model(backend).to_string());

        let max_tokens = parse_env("HOUSING_INTAKE_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let temperature = parse_env("HOUSING_INTAKE_TEMPERATURE", DEFAULT_TEMPERATURE)?;

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key,
                model,
            },
            max_tokens,
            temperature,
        })
    }
}

/// The environment variable holding the API key for a backend.
pub fn api_key_var(backend: LlmBackend) -> &'static str {
    match backend {
        LlmBackend::OpenAi => "OPENAI_API_KEY",
        LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
    }
}

/// The default model for a backend.
pub fn default_model(backend: LlmBackend) -> &'static str {
    match backend {
        LlmBackend::OpenAi => DEFAULT_OPENAI_MODEL,
        LlmBackend::Anthropic => DEFAULT_ANTHROPIC_MODEL,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e}"),
        }),
    }
}
