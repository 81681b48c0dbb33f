//! Relay strategy — POSTs the request to the trusted relay.
//!
//! The relay adds the protocol-version header itself, so only the API key
//! travels with the request.

use async_trait::async_trait;
use schemefinder_core::error::TransportError;
use schemefinder_core::transport::{CompletionRequest, Credential, Transport};
use schemefinder_core::CancellationToken;
use tracing::debug;

use crate::wire;

/// Reaches the completion service through the relay endpoint.
pub struct RelayTransport {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl RelayTransport {
    /// Create a relay strategy posting to `url` (the full relay endpoint).
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "relay".into(),
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, TransportError> {
        debug!(strategy = %self.name, url = %self.url, model = %request.model, "Sending via relay");

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", credential.expose())
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
impl Transport for RelayTransport {
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
