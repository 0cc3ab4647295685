//! Retry controller for per-review classification.
//!
//! Wraps [`Classifier`] with a bounded number of attempts, a safety pause
//! before every attempt, escalating backoff on rate limits and a fixed pause
//! on other transient failures. Whatever happens, the caller gets a
//! [`ClassificationResult`]: exhaustion yields the `Error` sentinel and a
//! missing credential yields `Pending`.

use super::classifier::Classifier;
use crate::config::RetryConfig;
use crate::error::{ClassifyError, PipelineError};
use crate::types::ClassificationResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Source of waits for the retry loop.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Map a provider error onto the retry taxonomy.
///
/// HTTP 429 and quota/rate wording are rate limits; everything else
/// (timeouts, 5xx, 4xx, transport errors) is a transient failure.
pub fn classify_failure(error: &PipelineError) -> ClassifyError {
    match error {
        PipelineError::Llm {
            status_code,
            message,
        } => {
            if *status_code == Some(429) || mentions_rate_limit(message) {
                ClassifyError::RateLimited(message.clone())
            } else {
                ClassifyError::TransientFailure(message.clone())
            }
        }
        PipelineError::Timeout { .. } => ClassifyError::TransientFailure(error.to_string()),
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("quota")
        || lower.contains("resource_exhausted")
        || lower.contains("resource exhausted")
}

/// Bounded-retry wrapper around a [`Classifier`].
pub struct RetryController {
    classifier: Arc<Classifier>,
    policy: RetryConfig,
    clock: Arc<dyn Clock>,
}

impl RetryController {
    pub fn new(classifier: Classifier, policy: RetryConfig) -> Self {
        Self::with_clock(classifier, policy, Arc::new(TokioClock))
    }

    /// Build a controller with a custom clock (tests use a recording clock).
    pub fn with_clock(classifier: Classifier, policy: RetryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier: Arc::new(classifier),
            policy,
            clock,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify one review, retrying transient failures.
    pub async fn classify_with_retry(&self, text: &str, credential: &str) -> ClassificationResult {
        if credential.trim().is_empty() {
            tracing::debug!("No API key, skipping classification");
            return ClassificationResult::pending();
        }
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            self.clock.sleep(self.policy.safety_delay()).await;

            let backoff = match self.classifier.classify(text, credential).await {
                Ok(result) => return result,
                Err(ClassifyError::Unauthenticated) => return ClassificationResult::pending(),
                Err(ClassifyError::RateLimited(msg)) => {
                    let delay = self.policy.rate_limit_delay(attempt);
                    tracing::warn!("Rate limited (attempt {attempt}/{max_attempts}): {msg}");
                    delay
                }
                Err(ClassifyError::TransientFailure(msg)) => {
                    tracing::warn!("Classification failed (attempt {attempt}/{max_attempts}): {msg}");
                    self.policy.transient_delay()
                }
            };

            if attempt < max_attempts {
                tracing::debug!("Retrying after {backoff:?}");
                self.clock.sleep(backoff).await;
            }
        }

        tracing::error!("Classification gave up after {max_attempts} attempts");
        ClassificationResult::error()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::provider::{LlmProvider, LlmRequest, LlmResponse};
    use crate::types::{Locale, Sentiment};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Clock that records requested waits and returns immediately.
    #[derive(Default)]
    pub(crate) struct RecordingClock {
        pub(crate) sleeps: Mutex<Vec<Duration>>,
    }

    impl RecordingClock {
        pub(crate) fn seconds(&self) -> Vec<u64> {
            self.sleeps
                .lock()
                .unwrap()
                .iter()
                .map(|d| d.as_secs())
                .collect()
        }
    }

    #[async_trait]
    impl Clock for RecordingClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Provider whose reply depends on the call index.
    pub(crate) struct ScriptedProvider {
        pub(crate) response_fn:
            Box<dyn Fn(u32) -> Result<LlmResponse, PipelineError> + Send + Sync>,
        pub(crate) call_count: Arc<AtomicU32>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(
            response_fn: impl Fn(u32) -> Result<LlmResponse, PipelineError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                response_fn: Box::new(response_fn),
                call_count: Arc::new(AtomicU32::new(0)),
            }
        }

        pub(crate) fn replying(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_| Ok(reply(&text)))
        }

        pub(crate) fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    pub(crate) fn reply(text: &str) -> LlmResponse {
        LlmResponse {
            text: text.to_string(),
            model: "mock-v1".to_string(),
            tokens_used: Some(10),
            latency_ms: 5,
        }
    }

    pub(crate) fn http_error(status: u16, message: &str) -> PipelineError {
        PipelineError::Llm {
            message: message.to_string(),
            status_code: Some(status),
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            _request: &LlmRequest,
            _api_key: &str,
        ) -> Result<LlmResponse, PipelineError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            (self.response_fn)(idx)
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn controller(provider: ScriptedProvider) -> (RetryController, Arc<RecordingClock>) {
        let clock = Arc::new(RecordingClock::default());
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);
        let controller = RetryController::with_clock(classifier, RetryConfig::default(), clock.clone());
        (controller, clock)
    }

    #[test]
    fn test_http_429_is_rate_limited() {
        let err = classify_failure(&http_error(429, "Too Many Requests"));
        assert!(matches!(err, ClassifyError::RateLimited(_)));
    }

    #[test]
    fn test_quota_message_is_rate_limited() {
        let err = classify_failure(&PipelineError::Llm {
            message: "Gemini: RESOURCE_EXHAUSTED quota exceeded".to_string(),
            status_code: None,
        });
        assert!(matches!(err, ClassifyError::RateLimited(_)));
    }

    #[test]
    fn test_server_and_auth_errors_are_transient() {
        assert!(matches!(
            classify_failure(&http_error(503, "service unavailable")),
            ClassifyError::TransientFailure(_)
        ));
        assert!(matches!(
            classify_failure(&http_error(401, "unauthorized")),
            ClassifyError::TransientFailure(_)
        ));
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = classify_failure(&PipelineError::Timeout {
            stage: "llm".to_string(),
            timeout_ms: 60_000,
        });
        assert!(matches!(err, ClassifyError::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_always_rate_limited_makes_three_attempts() {
        let provider = ScriptedProvider::new(|_| Err(http_error(429, "rate limited")));
        let calls = provider.call_count_handle();
        let (controller, clock) = controller(provider);

        let result = controller.classify_with_retry("Excellent !", "key").await;

        assert_eq!(result, ClassificationResult::error());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // safety, 5s x1, safety, 5s x2, safety (no wait after the last attempt)
        assert_eq!(clock.seconds(), vec![1, 5, 1, 10, 1]);
    }

    #[tokio::test]
    async fn test_transient_failures_use_fixed_delay() {
        let provider = ScriptedProvider::new(|_| Err(http_error(500, "internal error")));
        let calls = provider.call_count_handle();
        let (controller, clock) = controller(provider);

        let result = controller.classify_with_retry("text", "key").await;

        assert_eq!(result.sentiment, Sentiment::Error);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.seconds(), vec![1, 2, 1, 2, 1]);
    }

    #[tokio::test]
    async fn test_recovers_after_rate_limit() {
        let provider = ScriptedProvider::new(|idx| {
            if idx == 0 {
                Err(http_error(429, "slow down"))
            } else {
                Ok(reply("{\"sentiment\":\"Positif\",\"score\":5}"))
            }
        });
        let calls = provider.call_count_handle();
        let (controller, clock) = controller(provider);

        let result = controller.classify_with_retry("Excellent !", "key").await;

        assert_eq!(result, ClassificationResult::new(Sentiment::Positive, 5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(clock.seconds(), vec![1, 5, 1]);
    }

    #[tokio::test]
    async fn test_parse_failure_is_retried() {
        let provider = ScriptedProvider::new(|idx| {
            if idx == 0 {
                Ok(reply("Sorry, I can't do that"))
            } else {
                Ok(reply("{\"sentiment\":\"Neutre\",\"score\":3}"))
            }
        });
        let (controller, _clock) = controller(provider);

        let result = controller.classify_with_retry("Bof.", "key").await;
        assert_eq!(result, ClassificationResult::new(Sentiment::Neutral, 3));
    }

    #[tokio::test]
    async fn test_no_credential_returns_pending_without_retry() {
        let provider = ScriptedProvider::replying("{\"sentiment\":\"Positif\",\"score\":5}");
        let calls = provider.call_count_handle();
        let (controller, clock) = controller(provider);

        let result = controller.classify_with_retry("Excellent !", "").await;
        let blank = controller.classify_with_retry("Excellent !", "  \t").await;

        assert_eq!(result, ClassificationResult::pending());
        assert_eq!(blank, ClassificationResult::pending());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(clock.seconds().is_empty());
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let provider = ScriptedProvider::new(|_| Err(http_error(429, "rate limited")));
        let calls = provider.call_count_handle();
        let clock = Arc::new(RecordingClock::default());
        let policy = RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        };
        let controller = RetryController::with_clock(
            Classifier::new(Box::new(provider), Locale::Fr),
            policy,
            clock.clone(),
        );

        let result = controller.classify_with_retry("text", "key").await;
        assert_eq!(result, ClassificationResult::error());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(clock.seconds(), vec![1]);
    }
}
