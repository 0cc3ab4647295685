//! The classification chain shared by batch runs and the sandbox tester.

use std::sync::Arc;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::PipelineError;
use crate::llm::{Classifier, LlmProviderFactory, RetryController};
use crate::types::ClassificationResult;

/// Memoized, retrying review classifier.
pub struct ReviewAnalyzer {
    controller: RetryController,
    cache: Arc<ResultCache>,
}

impl ReviewAnalyzer {
    pub fn new(controller: RetryController, cache: Arc<ResultCache>) -> Self {
        Self { controller, cache }
    }

    /// Build the chain from configuration.
    ///
    /// `provider` and `model` override the config values when set.
    pub fn from_config(
        config: &Config,
        provider: Option<&str>,
        model: Option<&str>,
        cache: Arc<ResultCache>,
    ) -> Result<Self, PipelineError> {
        let provider_name = provider.unwrap_or(&config.llm.provider);
        let provider = LlmProviderFactory::create(provider_name, &config.llm, model)?;
        tracing::debug!("Using LLM provider: {}", provider.name());

        let classifier = Classifier::new(provider, config.locale());
        let controller = RetryController::new(classifier, config.retry.clone());
        Ok(Self::new(controller, cache))
    }

    /// Classify `text`, reusing any result already computed for the same
    /// text and credential.
    pub async fn analyze(&self, text: &str, credential: &str) -> ClassificationResult {
        self.cache
            .get_or_compute(text, credential, || {
                self.controller.classify_with_retry(text, credential)
            })
            .await
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.controller.classifier().provider_name()
    }
}
