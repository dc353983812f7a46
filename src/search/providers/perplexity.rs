//! Fallback market-search provider — the Perplexity chat completions API.
//!
//! Perplexity answers a standard chat completion, so parsing is strict:
//! an empty or missing `content` is an error, which lets the orchestrator
//! fall back to any partial data held from the primary provider.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, trace};

use crate::config::PerplexityProviderConfig;

use super::wire::{chat_request, check_status, transport_error};
use super::ProviderError;

#[derive(Debug, Clone)]
pub struct PerplexityProvider {
    client: Client,
    api_base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_seconds: u64,
    api_key: String,
}

impl PerplexityProvider {
    /// Build a provider from resolved config values.
    ///
    /// The API key is required here — callers gate construction on
    /// [`PerplexityProviderConfig::available`].
    pub fn new(
        config: &PerplexityProviderConfig,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Request("perplexity API key is not set".into()))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            max_tokens,
            temperature,
            timeout_seconds: config.timeout_seconds,
            api_key,
        })
    }

    /// Send the search prompts and return the trimmed answer text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = chat_request(&self.model, system, user, self.max_tokens, self.temperature);

        debug!(
            model = %payload.model,
            user_len = user.len(),
            "sending perplexity search request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full perplexity request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "perplexity HTTP request failed (transport)");
                transport_error(e, self.timeout_seconds)
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize perplexity response");
            ProviderError::Shape(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received perplexity response");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Shape("empty or missing content in response".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
