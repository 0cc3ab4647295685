//! Error types for the ReviewBot classification pipeline.
//!
//! Library-facing errors are organized by concern (configuration, dataset
//! loading, session state, provider transport). Classification failures are
//! a separate, closed taxonomy ([`ClassifyError`]) because they never escape
//! the classification chain: the retry controller turns every one of them
//! into a regular `ClassificationResult`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for ReviewBot operations.
#[derive(Error, Debug)]
pub enum ReviewBotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Review dataset errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// LLM provider errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while reading the review dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The file exists but could not be read
    #[error("Failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A required column is absent from the header row
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A row could not be parsed
    #[error("{path}:{line}: {message}")]
    Row {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Errors raised by the session state machine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A run was triggered while another one is still in progress
    #[error("A classification run is already in progress ({completed}/{total})")]
    RunInProgress { completed: usize, total: usize },
}

/// LLM provider errors (transport, HTTP status, timeouts).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// LLM request failed
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        /// HTTP status code when the failure came from an HTTP response
        status_code: Option<u16>,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },
}

/// Why a single classification attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// No credential was supplied; nothing was sent.
    #[error("no API key configured")]
    Unauthenticated,

    /// The provider signalled quota or rate exhaustion.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other remote, timeout or response-parsing failure.
    #[error("transient failure: {0}")]
    TransientFailure(String),
}

/// Convenience type alias for ReviewBot results.
pub type Result<T> = std::result::Result<T, ReviewBotError>;

/// Convenience type alias for provider-level results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
