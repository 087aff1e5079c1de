//! Answer generation via an OpenAI-compatible chat-completion API.
//!
//! A single non-streaming request per query. The endpoint, model, and
//! sampling parameters come from `[generation]` config; the credential is
//! read from the environment variable named there (Groq by default, since
//! its API speaks the OpenAI wire format).
//!
//! A hung provider is bounded by the client timeout and surfaces as an
//! ordinary error, which the query pipeline renders as answer text.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;

use crate::config::GenerationConfig;

/// Client for one OpenAI-compatible chat-completion endpoint.
pub struct GenerationClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
    client: reqwest::Client,
}

impl GenerationClient {
    /// Build a client from configuration and an already-resolved credential.
    ///
    /// Credential presence is the caller's concern (checked during query
    /// pipeline construction) so that a missing key is reported as a
    /// distinct condition, not a generic HTTP 401 later.
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the answer text, if the provider
    /// produced any. `Ok(None)` means a well-formed response with no
    /// recognizable answer field.
    pub async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Generation request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Generation API error {}: {}", status, text);
        }

        let json: Value = response
            .json()
            .await
            .context("Generation API returned malformed JSON")?;

        Ok(extract_answer(&json))
    }
}

/// Pull the answer out of a completion response.
///
/// `choices[0].message.content` is the primary field (chat-completion
/// shape); `choices[0].text` is the secondary (legacy completion shape).
fn extract_answer(json: &Value) -> Option<String> {
    let choice = json.get("choices")?.as_array()?.first()?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .map(str::to_string)
}
