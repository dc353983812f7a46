//! Shared chat-completion wire types.
//!
//! Both providers speak the OpenAI chat completions dialect: the request
//! body and the error envelope are identical, only response parsing
//! differs. Callers outside `providers` never see these types.

use serde::{Deserialize, Serialize};
use tracing::error;

use super::ProviderError;

#[derive(Debug, Serialize)]
pub(super) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Build the two-message (system + user) request body every search uses.
pub(super) fn chat_request(
    model: &str,
    system: &str,
    user: &str,
    max_tokens: u32,
    temperature: f32,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: system.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user.to_string(),
            },
        ],
        max_tokens,
        temperature,
    }
}

/// Map a reqwest transport failure to a provider error, keeping timeouts
/// distinguishable so the orchestrator can log them meaningfully.
pub(super) fn transport_error(e: reqwest::Error, timeout_seconds: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_seconds)
    } else {
        ProviderError::Request(e.to_string())
    }
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
pub(super) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "completion request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_has_system_then_user() {
        let req = chat_request("sonar", "sys prompt", "user prompt", 500, 0.2);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(req.max_tokens, 500);
    }

    #[test]
    fn chat_request_serializes_expected_fields() {
        let req = chat_request("sonar", "s", "u", 500, 0.2);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "sonar");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][1]["content"], "u");
    }
}
