// Anthropic Messages API client for insight text
use crate::application::error::SourceError;
use crate::application::upstream_api::TextGenerationApi;
use crate::infrastructure::config::InsightSettings;
use crate::infrastructure::http::{build_client, read_json, require_key};
use async_trait::async_trait;
use serde_json::json;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
}

impl AnthropicClient {
    pub fn new(settings: &InsightSettings, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            api_key,
        })
    }

    fn payload(&self, system: &str, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "system": system,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

/// Text of the first `text` content block.
fn extract_text(body: &serde_json::Value) -> Result<String, SourceError> {
    body.get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| SourceError::Malformed("missing 'content' array".to_string()))?
        .iter()
        .find(|block| block["type"] == "text")
        .and_then(|block| block["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| SourceError::Malformed("no text content block".to_string()))
}

#[async_trait]
impl TextGenerationApi for AnthropicClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, SourceError> {
        let api_key = require_key(&self.api_key, "ANTHROPIC_API_KEY")?;

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.payload(system, prompt))
            .send()
            .await?;

        let body: serde_json::Value = read_json(response).await?;
        extract_text(&body)
    }
}
