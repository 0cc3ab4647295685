//! OpenAI LLM provider using the Chat Completions API.
//!
//! Works against any OpenAI-compatible endpoint.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    fn body(&self, request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        }
    }
}

/// First choice's content, trimmed. A blank completion is an error so the
/// classifier never parses an empty string.
fn completion_text(resp: &ChatResponse) -> Result<String, PipelineError> {
    resp.choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::Llm {
            message: "OpenAI returned no content".to_string(),
            status_code: None,
        })
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        request: &LlmRequest,
        api_key: &str,
    ) -> Result<LlmResponse, PipelineError> {
        let start = Instant::now();

        let body = self.body(request);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| super::transport_error("OpenAI", self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Llm {
                message: format!("OpenAI HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| PipelineError::Llm {
            message: format!("Failed to parse OpenAI response: {e}"),
            status_code: None,
        })?;

        let text = completion_text(&chat_resp)?;

        Ok(LlmResponse {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(
            "https://api.openai.com/v1/chat/completions",
            "gpt-4o-mini",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_body_carries_prompt_as_single_user_message() {
        let request = LlmRequest::new("Classe cet avis".to_string());
        let json = serde_json::to_value(provider().body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Classe cet avis");
    }

    #[test]
    fn test_completion_text_takes_first_choice() {
        let raw = r#"{
            "choices": [
                {"message": {"content": "  {\"sentiment\":\"Positif\",\"score\":5}\n"}},
                {"message": {"content": "ignored"}}
            ],
            "model": "gpt-4o-mini-2024-07-18",
            "usage": {"total_tokens": 42}
        }"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(
            completion_text(&resp).unwrap(),
            "{\"sentiment\":\"Positif\",\"score\":5}"
        );
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn test_completion_text_rejects_empty_output() {
        let empty: ChatResponse =
            serde_json::from_str(r#"{"choices": [], "model": "m"}"#).unwrap();
        assert!(completion_text(&empty).is_err());

        let null: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": null}}], "model": "m"}"#,
        )
        .unwrap();
        assert!(completion_text(&null).is_err());
    }
}
