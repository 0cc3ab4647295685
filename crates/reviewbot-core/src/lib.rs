//! ReviewBot Core - customer review classification library.
//!
//! ReviewBot loads customer reviews from a CSV file, asks a language model
//! for each review's sentiment and a 0-5 quality score, and derives the
//! dashboard figures from the results.
//!
//! # Architecture
//!
//! ```text
//! Dataset → filter → BatchRunner → ResultCache → RetryController → Classifier → LLM
//!                                                                           ↓
//!                                             Session ← BatchRun ← (sentiment, score)
//! ```
//!
//! Every review gets a result: failures are absorbed into the `Error`
//! sentinel and a missing API key yields `Pending` without any remote call.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reviewbot_core::{Config, ReviewBot, Session};
//!
//! #[tokio::main]
//! async fn main() -> reviewbot_core::Result<()> {
//!     let bot = ReviewBot::new(Config::load()?);
//!     let runner = bot.runner(None, None)?;
//!
//!     let mut session = Session::new(bot.load_dataset()?);
//!     session.set_credential(bot.api_key(None));
//!     session.trigger(&runner, false, |done, total| println!("{done}/{total}")).await?;
//!     println!("{:?}", session.view().kpis());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-exports for convenient access
pub use cache::{CacheStats, ResultCache};
pub use config::Config;
pub use dataset::{Dataset, DatasetOrigin, SourceFilter};
pub use error::{
    ClassifyError, ConfigError, DatasetError, PipelineError, PipelineResult, Result,
    ReviewBotError, SessionError,
};
pub use output::{OutputFormat, ReportWriter};
pub use pipeline::{BatchRun, BatchRunner, ReviewAnalyzer, RunState, Session, TriggerOutcome};
pub use report::{DashboardView, Kpis, QualityBand, ReviewRow};
pub use types::{ClassificationResult, Locale, Review, Sentiment};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point tying configuration to a shared result cache.
///
/// Every analyzer built from the same `ReviewBot` shares one cache, so the
/// batch runner and the sandbox tester never pay twice for the same text.
pub struct ReviewBot {
    config: Config,
    cache: Arc<ResultCache>,
}

impl ReviewBot {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing ReviewBot v{}", VERSION);
        Self {
            config,
            cache: Arc::new(ResultCache::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Provider name after applying an optional override.
    pub fn provider_name<'a>(&'a self, provider: Option<&'a str>) -> &'a str {
        provider.unwrap_or(&self.config.llm.provider)
    }

    /// API key from the provider's environment variable or the config file.
    pub fn api_key(&self, provider: Option<&str>) -> Option<String> {
        llm::resolve_api_key(self.provider_name(provider), &self.config.llm)
    }

    /// Load the configured dataset (or the built-in sample if it is missing).
    pub fn load_dataset(&self) -> std::result::Result<Dataset, DatasetError> {
        Dataset::load(&self.config.dataset_path())
    }

    /// Build the classification chain backed by the shared cache.
    pub fn analyzer(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> PipelineResult<Arc<ReviewAnalyzer>> {
        ReviewAnalyzer::from_config(&self.config, provider, model, self.cache.clone()).map(Arc::new)
    }

    /// Build a batch runner backed by the shared cache.
    pub fn runner(&self, provider: Option<&str>, model: Option<&str>) -> PipelineResult<BatchRunner> {
        self.analyzer(provider, model).map(BatchRunner::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_analyzers_share_cache() {
        let bot = ReviewBot::new(Config::default());
        let a = bot.analyzer(None, None).unwrap();
        let b = bot.analyzer(Some("openai"), None).unwrap();
        assert!(Arc::ptr_eq(a.cache(), b.cache()));
        assert_eq!(a.provider_name(), "gemini");
        assert_eq!(b.provider_name(), "openai");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let bot = ReviewBot::new(Config::default());
        assert!(bot.runner(Some("ollama"), None).is_err());
    }

    #[test]
    fn test_provider_override() {
        let bot = ReviewBot::new(Config::default());
        assert_eq!(bot.provider_name(None), "gemini");
        assert_eq!(bot.provider_name(Some("anthropic")), "anthropic");
    }
}
