//! Direct strategy — calls the provider's Messages API without an intermediary.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header added by the client
//! - System prompt as top-level field

use async_trait::async_trait;
use schemefinder_core::error::TransportError;
use schemefinder_core::transport::{CompletionRequest, Credential, Transport};
use schemefinder_core::CancellationToken;
use tracing::debug;

use crate::wire::{self, ANTHROPIC_VERSION};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Reaches the provider directly.
pub struct DirectTransport {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl DirectTransport {
    /// Create a direct strategy against the default provider URL.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "direct".into(),
            base_url: DEFAULT_BASE_URL.into(),
            client,
        })
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, TransportError> {
        let url = wire::messages_url(&self.base_url);

        debug!(strategy = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        wire::decode(&self.name, status, &body)
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<String, TransportError> {
        cancel
            .run_until_cancelled(self.post(request, credential))
            .await
            .unwrap_or(Err(TransportError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request() -> CompletionRequest {
        CompletionRequest::for_prompt("test-model", 100, 0.5, None, "prompt")
    }

    fn key() -> Credential {
        Credential::new("sk-ant-test").unwrap()
    }

    #[test]
    fn constructor_with_base_url() {
        let direct = DirectTransport::new()
            .unwrap()
            .with_base_url("https://custom.proxy.com/");
        assert_eq!(direct.base_url(), "https://custom.proxy.com");
        assert_eq!(direct.name(), "direct");
    }

    #[tokio::test]
    async fn sends_version_header_and_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"hello"}]}"#)
            .create_async()
            .await;

        let direct = DirectTransport::new().unwrap().with_base_url(server.url());
        let text = direct
            .send(&request(), &key(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn auth_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#)
            .create_async()
            .await;

        let direct = DirectTransport::new().unwrap().with_base_url(server.url());
        let err = direct
            .send(&request(), &key(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::AuthenticationFailed("invalid x-api-key".into())
        );
    }

    #[tokio::test]
    async fn cancel_unblocks_stalled_server() {
        // A listener that accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let direct = DirectTransport::new()
            .unwrap()
            .with_base_url(format!("http://{addr}"));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = direct.send(&request(), &key(), &cancel).await.unwrap_err();
        assert_eq!(err, TransportError::Cancelled);
    }
}
