//! Upstream language-model call and response normalization.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::metrics::UPSTREAM_LATENCY;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Text returned when the model produced nothing usable.
pub const EMPTY_RESPONSE_TEXT: &str = "No response generated";

/// Something that turns a prompt (plus earlier messages) into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, history: &[String], prompt: &str) -> Result<String, UpstreamError>;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, history: &[String], prompt: &str) -> Result<String, UpstreamError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(history, prompt),
        };

        let start = Instant::now();
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Upstream returned an error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

        debug!(choices = parsed.choices.len(), "Upstream response received");
        Ok(parsed.first_content().unwrap_or_default().to_string())
    }
}

// history entries first, in order, then the prompt
pub fn build_messages<'a>(history: &'a [String], prompt: &'a str) -> Vec<ChatMessage<'a>> {
    history
        .iter()
        .map(|msg| ChatMessage {
            role: "user",
            content: msg.as_str(),
        })
        .chain(std::iter::once(ChatMessage {
            role: "user",
            content: prompt,
        }))
        .collect()
}

/// Keep the first `max_words` words, joined by single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let truncated = text
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");

    if truncated.is_empty() {
        EMPTY_RESPONSE_TEXT.to_string()
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_words() {
        let text = "  one two\nthree four five six seven eight nine ten eleven twelve ";
        assert_eq!(
            truncate_words(text, 10),
            "one two three four five six seven eight nine ten"
        );
        assert_eq!(truncate_words("short reply", 10), "short reply");
    }

    #[test]
    fn test_empty_output_fallback() {
        assert_eq!(truncate_words("", 10), EMPTY_RESPONSE_TEXT);
        assert_eq!(truncate_words(" \n\t", 10), EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn test_build_messages_order() {
        let history = vec!["Previous message 1".to_string(), "Previous message 2".to_string()];
        let messages = build_messages(&history, "Current message");

        let contents: Vec<&str> = messages.iter().map(|m| m.content).collect();
        assert_eq!(
            contents,
            ["Previous message 1", "Previous message 2", "Current message"]
        );
        assert!(messages.iter().all(|m| m.role == "user"));
    }
}
