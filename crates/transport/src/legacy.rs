//! Legacy strategy — a synchronous HTTP client driven from a blocking thread.
//!
//! Last resort when the async client cannot get through. The blocking request
//! runs on tokio's blocking pool; on cancel the await on the worker is
//! abandoned immediately and the worker finishes on its own request timeout.

use std::time::Duration;

use async_trait::async_trait;
use schemefinder_core::error::TransportError;
use schemefinder_core::transport::{CompletionRequest, Credential, Transport};
use schemefinder_core::CancellationToken;
use tracing::debug;

use crate::wire::{self, ANTHROPIC_VERSION};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct LegacyTransport {
    name: String,
    base_url: String,
    request_timeout: Duration,
}

impl LegacyTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            name: "legacy".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Hard cap on the blocking request itself, independent of cancellation.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Runs on the blocking pool; must not touch the async runtime.
fn blocking_post(
    strategy: &str,
    url: &str,
    api_key: &str,
    body: Vec<u8>,
    timeout: Duration,
) -> Result<String, TransportError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::NotConfigured(format!("HTTP client: {e}")))?;

    let response = client
        .post(url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .map_err(|e| TransportError::Network(e.to_string()))?;

    wire::decode(strategy, status, &text)
}

#[async_trait]
impl Transport for LegacyTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<String, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let body = serde_json::to_vec(request)
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to encode request: {e}")))?;
        let url = wire::messages_url(&self.base_url);
        let api_key = credential.expose().to_string();
        let strategy = self.name.clone();
        let timeout = self.request_timeout;

        debug!(strategy = %self.name, model = %request.model, "Sending blocking completion request");

        let worker = tokio::task::spawn_blocking(move || {
            blocking_post(&strategy, &url, &api_key, body, timeout)
        });

        match cancel.run_until_cancelled(worker).await {
            None => Err(TransportError::Cancelled),
            Some(Ok(result)) => result,
            Some(Err(join_err)) => Err(TransportError::Network(format!(
                "legacy worker failed: {join_err}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest::for_prompt("test-model", 100, 0.5, None, "prompt")
    }

    fn key() -> Credential {
        Credential::new("sk-ant-test").unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blocking_request_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"legacy ok"}]}"#)
            .create_async()
            .await;

        let legacy = LegacyTransport::new(server.url());
        let text = legacy
            .send(&request(), &key(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "legacy ok");
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_success_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let legacy = LegacyTransport::new(server.url());
        let err = legacy
            .send(&request(), &key(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Api { status_code: 503, .. }));
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let legacy = LegacyTransport::new("http://127.0.0.1:9");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = legacy.send(&request(), &key(), &cancel).await.unwrap_err();
        assert_eq!(err, TransportError::Cancelled);
    }
}
