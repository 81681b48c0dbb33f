//! Messages API wire handling shared by every strategy.
//!
//! Covers decoding the response body into raw model text and mapping
//! non-success statuses onto `TransportError`.

use schemefinder_core::error::TransportError;
use serde::Deserialize;
use tracing::{trace, warn};

/// Protocol version header required by the upstream provider.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Path appended to a provider base URL.
pub const MESSAGES_PATH: &str = "/v1/messages";

/// Build `{base_url}/v1/messages`, tolerating a trailing slash.
pub fn messages_url(base_url: &str) -> String {
    format!("{}{MESSAGES_PATH}", base_url.trim_end_matches('/'))
}

/// Turn a completed HTTP exchange into the model's text or a failure reason.
pub fn decode(strategy: &str, status: u16, body: &str) -> Result<String, TransportError> {
    trace!(strategy, status, body_len = body.len(), "Decoding response");

    if !(200..300).contains(&status) {
        let err = status_error(status, body);
        warn!(strategy, status, error = %err, "Upstream returned non-success status");
        return Err(err);
    }

    if body.trim().is_empty() {
        return Err(TransportError::EmptyBody(format!(
            "'{strategy}' returned status {status} with no body"
        )));
    }

    text_from_body(body)
}

/// Map a non-2xx status to a failure reason.
pub fn status_error(status: u16, body: &str) -> TransportError {
    match status {
        429 => TransportError::RateLimited {
            retry_after_secs: 5,
        },
        401 | 403 => TransportError::AuthenticationFailed(error_message(body)),
        _ => TransportError::Api {
            status_code: status,
            message: error_message(body),
        },
    }
}

/// Pull a readable message out of an error body.
///
/// Understands the relay's `{"error": "..."}` and the provider's
/// `{"error": {"message": "..."}}`; anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match &value["error"] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string()),
        _ => body.trim().to_string(),
    }
}

/// Concatenate the `text` content blocks of a Messages API response.
pub fn text_from_body(body: &str) -> Result<String, TransportError> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        TransportError::InvalidResponse(format!("Failed to parse completion response: {e}"))
    })?;

    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            ResponseContentBlock::Text { text } => Some(text.as_str()),
            ResponseContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(TransportError::EmptyBody(
            "completion response had no text content".into(),
        ));
    }

    Ok(text)
}

// --- Messages API types ---

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_trims_slash() {
        assert_eq!(
            messages_url("https://api.anthropic.com/"),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            messages_url("http://localhost:9000"),
            "http://localhost:9000/v1/messages"
        );
    }

    #[test]
    fn text_blocks_are_joined() {
        let body = r#"{
            "id": "msg_1",
            "model": "claude-3-5-sonnet-20240620",
            "content": [
                {"type": "text", "text": "first"},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}},
                {"type": "text", "text": "second"}
            ]
        }"#;
        assert_eq!(text_from_body(body).unwrap(), "first\nsecond");
    }

    #[test]
    fn response_without_text_is_empty_body() {
        let err = text_from_body(r#"{"content": []}"#).unwrap_err();
        assert!(matches!(err, TransportError::EmptyBody(_)));
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        let err = text_from_body("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(429, ""),
            TransportError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(401, r#"{"error":{"message":"invalid x-api-key"}}"#),
            TransportError::AuthenticationFailed(m) if m == "invalid x-api-key"
        ));
        assert_eq!(
            status_error(400, r#"{"error":"API key is required"}"#),
            TransportError::Api {
                status_code: 400,
                message: "API key is required".into()
            }
        );
        assert_eq!(
            status_error(500, "boom"),
            TransportError::Api {
                status_code: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn decode_rejects_empty_success() {
        let err = decode("relay", 204, "").unwrap_err();
        assert!(matches!(err, TransportError::EmptyBody(_)));
    }
}
