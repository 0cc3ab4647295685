//! Sub-configuration structs with their defaults.

use crate::types::Locale;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Review dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file holding the reviews. A built-in sample is used when absent.
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "AVIS-CLIENTS.csv".to_string(),
        }
    }
}

/// Retry policy for a single review's classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per review, including the first
    pub max_attempts: u32,

    /// Pause before every attempt, to avoid bursting the endpoint
    pub safety_delay_ms: u64,

    /// Rate-limit backoff unit, multiplied by the 1-indexed attempt number
    pub rate_limit_base_ms: u64,

    /// Fixed pause after any other transient failure
    pub transient_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            safety_delay_ms: 1000,
            rate_limit_base_ms: 5000,
            transient_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    pub fn safety_delay(&self) -> Duration {
        Duration::from_millis(self.safety_delay_ms)
    }

    pub fn transient_delay(&self) -> Duration {
        Duration::from_millis(self.transient_delay_ms)
    }

    /// Escalating wait after a rate-limited attempt (`attempt` is 1-indexed).
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.rate_limit_base_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Dashboard display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Label and prompt language ("fr" or "en")
    pub locale: Locale,

    /// Maximum rows printed in the detail table
    pub table_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Fr,
            table_rows: 50,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Active provider: "gemini", "openai" or "anthropic"
    pub provider: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Google Gemini configuration
    pub gemini: GeminiConfig,

    /// OpenAI configuration
    pub openai: OpenAiConfig,

    /// Anthropic configuration
    pub anthropic: AnthropicConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            timeout_ms: 60_000,
            gemini: GeminiConfig::default(),
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GOOGLE_API_KEY}".to_string(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat Completions URL (any OpenAI-compatible server works)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
        }
    }
}
