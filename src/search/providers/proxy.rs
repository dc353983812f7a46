//! Primary market-search provider — the internal proxy server.
//!
//! The proxy fronts an OpenAI-compatible completion endpoint but is not a
//! disciplined citizen: depending on the model deployed behind it the
//! response may be a standard chat completion, a bare top-level `content`
//! field, or a plain string where `choices[0].message` should be.
//! [`normalize_reply`] accepts all three; content recovered from a
//! non-standard shape is flagged partial so the orchestrator can prefer a
//! clean fallback answer over it.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::config::ProxyProviderConfig;

use super::wire::{chat_request, check_status, transport_error};
use super::{ProviderError, ProviderReply};

/// Adapter for the proxy server's chat completions endpoint.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct ProxyServerProvider {
    client: Client,
    api_base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_seconds: u64,
    api_key: String,
}

impl ProxyServerProvider {
    /// Build a provider from resolved config values.
    ///
    /// The API key is required here — callers gate construction on
    /// [`ProxyProviderConfig::available`].
    pub fn new(
        config: &ProxyProviderConfig,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Request("proxy server API key is not set".into()))?;

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

    /// Send the search prompts and normalize whatever comes back.
    ///
    /// One round trip only — retry and fallback policy live in the
    /// orchestrator.
    pub async fn complete(&self, system: &str, user: &str) -> Result<ProviderReply, ProviderError> {
        let payload = chat_request(&self.model, system, user, self.max_tokens, self.temperature);

        debug!(
            model = %payload.model,
            user_len = user.len(),
            "sending proxy search request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full proxy request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "proxy HTTP request failed (transport)");
                transport_error(e, self.timeout_seconds)
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<Value>().await.map_err(|e| {
            error!(error = %e, "failed to read proxy response body");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(response = %parsed, "full proxy response payload");
        }

        normalize_reply(&parsed)
    }
}

/// Accept the response shapes the proxy is known to produce.
///
/// Priority order: the standard chat completion wins; the lenient shapes
/// are tried afterwards and marked partial.
fn normalize_reply(value: &Value) -> Result<ProviderReply, ProviderError> {
    let standard = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str);
    if let Some(content) = standard {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            return Ok(ProviderReply {
                content: trimmed.to_string(),
                partial: false,
            });
        }
        warn!("proxy returned a standard shape with empty content");
    }

    // Some proxy deployments answer with a top-level `content` field.
    if let Some(content) = value.get("content").and_then(Value::as_str) {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            warn!("proxy returned top-level content — treating as partial");
            return Ok(ProviderReply {
                content: trimmed.to_string(),
                partial: true,
            });
        }
    }

    // Or with a bare string instead of a message object in choices[0].
    if let Some(content) = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(Value::as_str)
    {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            warn!("proxy returned a bare choice string — treating as partial");
            return Ok(ProviderReply {
                content: trimmed.to_string(),
                partial: true,
            });
        }
    }

    Err(ProviderError::Shape(excerpt(value)))
}

/// Compact single-line excerpt of an unrecognised payload for error messages.
fn excerpt(value: &Value) -> String {
    const MAX_CHARS: usize = 240;
    let s = value.to_string();
    if s.chars().count() <= MAX_CHARS {
        return s;
    }
    let mut out: String = s.chars().take(MAX_CHARS).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_shape_is_full_reply() {
        let value = json!({
            "choices": [{"message": {"content": "  giá trung bình 85 triệu/m2  "}}]
        });
        let reply = normalize_reply(&value).unwrap();
        assert_eq!(reply.content, "giá trung bình 85 triệu/m2");
        assert!(!reply.partial);
    }

    #[test]
    fn top_level_content_is_partial() {
        let value = json!({"content": "kết quả rút gọn"});
        let reply = normalize_reply(&value).unwrap();
        assert_eq!(reply.content, "kết quả rút gọn");
        assert!(reply.partial);
    }

    #[test]
    fn bare_choice_string_is_partial() {
        let value = json!({"choices": ["chuỗi trả lời thô"]});
        let reply = normalize_reply(&value).unwrap();
        assert_eq!(reply.content, "chuỗi trả lời thô");
        assert!(reply.partial);
    }

    #[test]
    fn empty_standard_content_falls_through() {
        let value = json!({
            "choices": [{"message": {"content": "   "}}],
            "content": "dự phòng"
        });
        let reply = normalize_reply(&value).unwrap();
        assert_eq!(reply.content, "dự phòng");
        assert!(reply.partial);
    }

    #[test]
    fn unrecognised_shape_errors() {
        let value = json!({"status": "ok", "data": [1, 2, 3]});
        let err = normalize_reply(&value).unwrap_err();
        assert!(matches!(err, ProviderError::Shape(_)));
    }

    #[test]
    fn excerpt_truncates_long_payloads() {
        let value = json!({"content_like": "x".repeat(1000)});
        let s = excerpt(&value);
        assert!(s.chars().count() <= 241);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn new_requires_api_key() {
        let config = ProxyProviderConfig {
            enabled: true,
            api_base_url: "http://localhost:0".into(),
            model: "test-model".into(),
            timeout_seconds: 1,
            api_key: None,
        };
        assert!(ProxyServerProvider::new(&config, 500, 0.2).is_err());
    }

    #[test]
    fn new_with_key_constructs() {
        let config = ProxyProviderConfig {
            enabled: true,
            api_base_url: "http://localhost:0".into(),
            model: "test-model".into(),
            timeout_seconds: 1,
            api_key: Some("sk-test".into()),
        };
        assert!(ProxyServerProvider::new(&config, 500, 0.2).is_ok());
    }
}
