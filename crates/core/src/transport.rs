//! Transport trait — the abstraction over ways of reaching the completion service.
//!
//! A Transport knows how to deliver one completion request and hand back the
//! model's raw text. Implementations: relay, direct, legacy blocking client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::TransportError;

/// A single message in the outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// The outbound completion request body.
///
/// Serializes directly to the Messages API wire shape, which is also what the
/// relay accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier (e.g., "claude-3-5-sonnet-20240620")
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Exactly one user message carrying the projected prompt
    pub messages: Vec<ChatMessage>,

    /// System instruction constraining the output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl CompletionRequest {
    /// Build a request wrapping `prompt` as the single user message.
    pub fn for_prompt(
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        system: Option<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
            messages: vec![ChatMessage::user(prompt)],
            system,
        }
    }

    /// The prompt text of the (single) user message.
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// An API key supplied by the caller for one call.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key, returning `None` when it is blank.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// The core Transport trait.
///
/// The chain calls `send()` without knowing how the request travels.
/// Implementations must return promptly once `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    /// A human-readable name for this strategy (e.g., "relay", "direct").
    fn name(&self) -> &str;

    /// Deliver the request and return the model's raw text.
    async fn send(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_wire_shape() {
        let req = CompletionRequest::for_prompt(
            "claude-3-5-sonnet-20240620",
            4000,
            0.5,
            Some("Return only JSON".into()),
            "hello",
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-3-5-sonnet-20240620");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["system"], "Return only JSON");
        assert_eq!(req.prompt(), "hello");
    }

    #[test]
    fn system_omitted_when_absent() {
        let req = CompletionRequest::for_prompt("m", 1, 0.0, None, "p");
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn credential_rejects_blank_and_redacts() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());

        let key = Credential::new(" sk-ant-test ").unwrap();
        assert_eq!(key.expose(), "sk-ant-test");
        assert!(!format!("{key:?}").contains("sk-ant"));
    }
}
