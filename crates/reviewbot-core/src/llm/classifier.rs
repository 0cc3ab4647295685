//! Single-call review classifier.
//!
//! Builds the instruction prompt, performs exactly one provider call, and
//! turns the free-form completion into a [`ClassificationResult`]. Models
//! routinely wrap the JSON in markdown fences or chatter, so only the slice
//! between the first `{` and the last `}` is parsed, and missing fields fall
//! back to defaults instead of failing the call.

use super::provider::{LlmProvider, LlmRequest};
use super::retry::classify_failure;
use crate::error::ClassifyError;
use crate::types::{ClassificationResult, Locale, Sentiment};
use serde_json::Value;
use std::sync::Arc;

/// Wraps one LLM provider call per review.
pub struct Classifier {
    provider: Arc<dyn LlmProvider>,
    locale: Locale,
}

impl Classifier {
    pub fn new(provider: Box<dyn LlmProvider>, locale: Locale) -> Self {
        Self {
            provider: Arc::from(provider),
            locale,
        }
    }

    /// Provider name, for logging.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Classify one review with one remote call.
    ///
    /// An empty credential fails with [`ClassifyError::Unauthenticated`]
    /// before any I/O. Provider errors and unparseable responses are mapped
    /// onto the retry taxonomy.
    pub async fn classify(
        &self,
        text: &str,
        credential: &str,
    ) -> Result<ClassificationResult, ClassifyError> {
        if credential.trim().is_empty() {
            return Err(ClassifyError::Unauthenticated);
        }

        let request = LlmRequest::new(build_prompt(text, self.locale));
        let timeout = self.provider.timeout();

        let response = match tokio::time::timeout(
            timeout,
            self.provider.generate(&request, credential),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify_failure(&e)),
            Err(_) => {
                return Err(ClassifyError::TransientFailure(format!(
                    "Timeout after {}ms",
                    timeout.as_millis()
                )))
            }
        };

        tracing::trace!(
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = ?response.tokens_used,
            "LLM response received"
        );

        parse_response(&response.text).map_err(ClassifyError::TransientFailure)
    }
}

/// Build the deterministic classification prompt for `text`.
pub fn build_prompt(text: &str, locale: Locale) -> String {
    match locale {
        Locale::Fr => format!(
            "Analyse l'avis client suivant. Réponds uniquement en JSON strict :\n\
             {{ \"sentiment\": \"Positif\" | \"Négatif\" | \"Neutre\", \"score\": entier de 0 à 5 }}\n\
             Avis : \"{text}\""
        ),
        Locale::En => format!(
            "Analyze the following customer review. Answer with strict JSON only:\n\
             {{ \"sentiment\": \"Positive\" | \"Negative\" | \"Neutral\", \"score\": integer from 0 to 5 }}\n\
             Review: \"{text}\""
        ),
    }
}

/// Return the slice from the first `{` to the last `}`, if both exist in order.
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Parse a raw completion into a result, substituting defaults for missing fields.
pub fn parse_response(raw: &str) -> Result<ClassificationResult, String> {
    let payload =
        extract_json(raw).ok_or_else(|| format!("no JSON object in response: {raw:?}"))?;

    let value: Value =
        serde_json::from_str(payload).map_err(|e| format!("invalid JSON in response: {e}"))?;
    let Value::Object(fields) = value else {
        return Err(format!("response is not a JSON object: {payload}"));
    };

    let sentiment = match fields.get("sentiment") {
        Some(Value::String(label)) => Sentiment::from_label(label).unwrap_or_else(|| {
            tracing::warn!("Unrecognized sentiment label '{label}', using Neutral");
            Sentiment::Neutral
        }),
        _ => Sentiment::Neutral,
    };

    let score = fields.get("score").map(parse_score).unwrap_or(0);

    Ok(ClassificationResult::new(sentiment, score))
}

/// Integers, floats (rounded) and numeric strings; everything else is 0.
fn parse_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, f64::from(crate::types::MAX_SCORE)) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::llm::provider::LlmResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Provider that returns a canned result and counts calls.
    struct StubProvider {
        response: Result<String, (Option<u16>, String)>,
        call_count: Arc<AtomicU32>,
        delay: Option<Duration>,
    }

    impl StubProvider {
        fn replying(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        fn failing(status_code: Option<u16>, message: &str) -> Self {
            Self {
                response: Err((status_code, message.to_string())),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            _request: &LlmRequest,
            _api_key: &str,
        ) -> Result<LlmResponse, PipelineError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.response {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    model: "stub-v1".to_string(),
                    tokens_used: None,
                    latency_ms: 1,
                }),
                Err((status_code, message)) => Err(PipelineError::Llm {
                    message: message.clone(),
                    status_code: *status_code,
                }),
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(50)
        }
    }

    #[test]
    fn test_extracts_json_from_fenced_chatter() {
        let raw = "Here you go:\n```json\n{\"sentiment\":\"Positif\",\"score\":4}\n```\nThanks";
        assert_eq!(
            extract_json(raw),
            Some("{\"sentiment\":\"Positif\",\"score\":4}")
        );
        let result = parse_response(raw).unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.score, 4);
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let result = parse_response("{\"sentiment\":\"Positif\"}").unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_missing_sentiment_defaults_to_neutral() {
        let result = parse_response("{\"score\": 3}").unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.score, 3);
    }

    #[test]
    fn test_no_braces_is_parse_failure() {
        assert!(parse_response("I cannot answer that.").is_err());
        assert!(parse_response("} backwards {").is_err());
    }

    #[test]
    fn test_invalid_json_is_parse_failure() {
        assert!(parse_response("{sentiment: Positif}").is_err());
    }

    #[test]
    fn test_score_variants() {
        assert_eq!(parse_response("{\"sentiment\":\"Neutre\",\"score\":3.6}").unwrap().score, 4);
        assert_eq!(parse_response("{\"sentiment\":\"Neutre\",\"score\":\"2\"}").unwrap().score, 2);
        assert_eq!(parse_response("{\"sentiment\":\"Neutre\",\"score\":12}").unwrap().score, 5);
        assert_eq!(parse_response("{\"sentiment\":\"Neutre\",\"score\":-1}").unwrap().score, 0);
        assert_eq!(parse_response("{\"sentiment\":\"Neutre\",\"score\":null}").unwrap().score, 0);
    }

    #[test]
    fn test_unknown_label_maps_to_neutral() {
        let result = parse_response("{\"sentiment\":\"Mitigé\",\"score\":3}").unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.score, 3);
    }

    #[test]
    fn test_prompt_embeds_text_per_locale() {
        let fr = build_prompt("Excellent !", Locale::Fr);
        assert!(fr.contains("Avis : \"Excellent !\""));
        assert!(fr.contains("Négatif"));

        let en = build_prompt("Great food", Locale::En);
        assert!(en.contains("Review: \"Great food\""));
        assert!(en.contains("Negative"));
    }

    #[tokio::test]
    async fn test_empty_credential_makes_no_call() {
        let provider = StubProvider::replying("{\"sentiment\":\"Positif\",\"score\":5}");
        let calls = provider.call_count.clone();
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);

        let err = classifier.classify("Excellent !", "").await.unwrap_err();
        assert_eq!(err, ClassifyError::Unauthenticated);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_call() {
        let provider = StubProvider::replying("```json\n{\"sentiment\":\"Négatif\",\"score\":1}\n```");
        let calls = provider.call_count.clone();
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);

        let result = classifier.classify("Horrible attente.", "key").await.unwrap();
        assert_eq!(result, ClassificationResult::new(Sentiment::Negative, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_distinct() {
        let provider = StubProvider::failing(Some(429), "quota exceeded");
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);

        let err = classifier.classify("text", "key").await.unwrap_err();
        assert!(matches!(err, ClassifyError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_garbage_response_is_transient() {
        let provider = StubProvider::replying("no json here");
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);

        let err = classifier.classify("text", "key").await.unwrap_err();
        assert!(matches!(err, ClassifyError::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transient() {
        let mut provider = StubProvider::replying("{\"sentiment\":\"Positif\",\"score\":5}");
        provider.delay = Some(Duration::from_secs(5));
        let classifier = Classifier::new(Box::new(provider), Locale::Fr);

        let err = classifier.classify("text", "key").await.unwrap_err();
        match err {
            ClassifyError::TransientFailure(msg) => assert!(msg.contains("Timeout"), "Got: {msg}"),
            other => panic!("Expected timeout, got {other:?}"),
        }
    }
}
