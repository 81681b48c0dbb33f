//! Transport chain — ordered fallback with per-strategy deadlines.
//!
//! When a strategy fails (network error, bad status, timeout), the next one in
//! the configured order is tried. Strategies run strictly one after another so
//! a request is never billed twice in parallel.

use schemefinder_core::error::TransportError;
use schemefinder_core::transport::{CompletionRequest, Credential, Transport};
use schemefinder_core::CancellationToken;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Deadline used by [`TransportChain::add_default`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An ordered list of strategies, each attempted exactly once per `send`.
pub struct TransportChain {
    chain: Vec<ChainEntry>,
}

/// A single entry in the chain.
struct ChainEntry {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl TransportChain {
    /// Create a new chain with no entries.
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Add a strategy with its own deadline.
    pub fn add(mut self, transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        self.chain.push(ChainEntry { transport, timeout });
        self
    }

    /// Add a strategy with the default deadline (30s).
    pub fn add_default(self, transport: Arc<dyn Transport>) -> Self {
        self.add(transport, DEFAULT_TIMEOUT)
    }

    /// Number of strategies in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Strategy names in attempt order.
    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|e| e.transport.name()).collect()
    }

    /// Walk the chain until one strategy returns text.
    ///
    /// On exhaustion the error is `Exhausted`, carrying the last failure.
    pub async fn send(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, TransportError> {
        if self.chain.is_empty() {
            return Err(TransportError::NotConfigured(
                "No strategies in transport chain".into(),
            ));
        }

        let mut last_error = None;

        for (i, entry) in self.chain.iter().enumerate() {
            let strategy = entry.transport.name();

            info!(
                strategy = %strategy,
                attempt = i + 1,
                total = self.chain.len(),
                "Transport: trying strategy"
            );

            match Self::attempt(entry, request, credential).await {
                Ok(text) => {
                    info!(strategy = %strategy, chars = text.len(), "Transport: strategy succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        strategy = %strategy,
                        error = %e,
                        "Transport: strategy failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(TransportError::Exhausted {
            attempts: self.chain.len(),
            last: Box::new(last_error.unwrap_or(TransportError::Cancelled)),
        })
    }

    /// One attempt bounded by the entry's deadline.
    ///
    /// When the deadline passes the strategy's token is fired and its future
    /// dropped, so a stalled strategy can never hold up the chain.
    async fn attempt(
        entry: &ChainEntry,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> Result<String, TransportError> {
        let cancel = CancellationToken::new();
        let timed_out = || TransportError::Timeout {
            strategy: entry.transport.name().to_string(),
            timeout_ms: entry.timeout.as_millis() as u64,
        };

        let send = entry.transport.send(request, credential, &cancel);

        tokio::select! {
            result = send => result,
            _ = tokio::time::sleep(entry.timeout) => {
                cancel.cancel();
                Err(timed_out())
            }
        }
    }
}

impl Default for TransportChain {
    fn default() -> Self {
        Self::new()
    }
}
