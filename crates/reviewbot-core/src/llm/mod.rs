//! LLM integration for review classification.
//!
//! Provides a provider abstraction over several LLM backends (Gemini, OpenAI,
//! Anthropic), a single-call [`Classifier`] that turns completions into
//! typed results, and the [`RetryController`] that bounds attempts per review.

pub(crate) mod anthropic;
pub mod classifier;
pub(crate) mod gemini;
pub(crate) mod openai;
pub mod provider;
pub mod retry;

pub use classifier::Classifier;
pub use provider::{
    env_var_for, resolve_api_key, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse,
};
pub use retry::{Clock, RetryController, TokioClock};

use crate::error::PipelineError;
use std::time::Duration;

/// Provider identifiers accepted in config and on the command line.
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini", "openai", "anthropic"];

/// Convert a reqwest transport failure into a pipeline error.
pub(crate) fn transport_error(provider: &str, timeout: Duration, e: reqwest::Error) -> PipelineError {
    if e.is_timeout() {
        PipelineError::Timeout {
            stage: format!("{provider} request"),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        PipelineError::Llm {
            message: format!("{provider} request failed: {e}"),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }
}
