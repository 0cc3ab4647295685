//! LLM provider trait and request/response types.
//!
//! Defines the interface that all LLM providers implement, plus the
//! factory that creates the right provider from CLI flags and config.
//!
//! The API key is passed per call rather than baked into the provider: the
//! key is part of every cache key and may be supplied mid-session.

use crate::config::LlmConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use std::time::Duration;

/// A text-completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Build a request with settings suited to short structured answers.
    pub fn new(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: 100,
            temperature: 0.0,
        }
    }
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send one prompt and return the raw completion.
    async fn generate(
        &self,
        request: &LlmRequest,
        api_key: &str,
    ) -> Result<LlmResponse, PipelineError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Environment variable consulted first for a provider's API key.
pub fn env_var_for(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("GOOGLE_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// Resolve the API key for `provider` from the environment, then config.
///
/// Returns `None` when no key is available; classification is then disabled
/// rather than failing.
pub fn resolve_api_key(provider: &str, config: &LlmConfig) -> Option<String> {
    if let Some(key) = env_var_for(provider)
        .and_then(|var| std::env::var(var).ok())
        .filter(|k| !k.is_empty())
    {
        return Some(key);
    }

    let configured = match provider {
        "gemini" => &config.gemini.api_key,
        "openai" => &config.openai.api_key,
        "anthropic" => &config.anthropic.api_key,
        _ => return None,
    };
    resolve_env_var(configured)
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on provider name, config, and optional model override.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("gemini", "openai", "anthropic")
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
    ) -> Result<Box<dyn LlmProvider>, PipelineError> {
        let timeout = config.timeout();
        match provider {
            "gemini" => {
                let cfg = &config.gemini;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    model,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = &config.openai;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    model,
                    timeout,
                )))
            }
            "anthropic" => {
                let cfg = &config.anthropic;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    model, timeout,
                )))
            }
            other => Err(PipelineError::Llm {
                message: format!("Unknown LLM provider: {other}"),
                status_code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_resolve_api_key_from_config_literal() {
        let mut config = LlmConfig::default();
        config.anthropic.api_key = "sk-ant-literal".to_string();
        // Only meaningful when the env var is unset on the test machine
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            assert_eq!(
                resolve_api_key("anthropic", &config),
                Some("sk-ant-literal".to_string())
            );
        }
    }

    #[test]
    fn test_resolve_api_key_unknown_provider() {
        assert_eq!(resolve_api_key("ollama", &LlmConfig::default()), None);
    }

    #[test]
    fn test_env_var_for_all_providers() {
        assert_eq!(env_var_for("gemini"), Some("GOOGLE_API_KEY"));
        assert_eq!(env_var_for("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for("anthropic"), Some("ANTHROPIC_API_KEY"));
        assert_eq!(env_var_for("other"), None);
    }

    #[test]
    fn test_factory_creates_known_providers() {
        let config = LlmConfig::default();
        for name in ["gemini", "openai", "anthropic"] {
            let provider = LlmProviderFactory::create(name, &config, None).unwrap();
            assert_eq!(provider.name(), name);
            assert_eq!(provider.timeout(), Duration::from_secs(60));
        }
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let result = LlmProviderFactory::create("hyperbolic", &LlmConfig::default(), None);
        assert!(result.is_err());
    }
}
