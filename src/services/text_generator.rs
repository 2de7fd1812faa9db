use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Injected capability for generative-text calls. Question generation and
/// free-text evaluation both degrade to deterministic fallbacks when the
/// implementation is disabled or fails, so callers branch on [`enabled`]
/// instead of treating absence as an exception.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn enabled(&self) -> bool;
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions backed generator with a bounded per-request timeout.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl OpenAiTextGenerator {
    pub fn new(api_key: String, client: Client, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    fn enabled(&self) -> bool {
        true
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.7
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "OpenAI API Error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Internal("Invalid OpenAI response format".to_string()))
    }
}

/// Used when no generative credential is configured. Always routes callers
/// to the deterministic fallback paths.
#[derive(Clone, Default)]
pub struct NoopTextGenerator;

#[async_trait]
impl TextGenerator for NoopTextGenerator {
    fn enabled(&self) -> bool {
        false
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        Err(Error::Internal(
            "text generation is not configured".to_string(),
        ))
    }
}

pub fn text_generator_from_config(config: &Config, client: Client) -> Arc<dyn TextGenerator> {
    match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiTextGenerator::new(
            key.clone(),
            client,
            Duration::from_secs(config.ai_timeout_secs),
        )),
        None => {
            tracing::info!("No OPENAI_API_KEY configured, using fallback question banks");
            Arc::new(NoopTextGenerator)
        }
    }
}
