//! Error types for the SchemeFinder domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Transport failures have their own enum because they are recovered
//! internally; only the top-level `Error` ever reaches a caller.

use thiserror::Error;

/// The top-level error type for all SchemeFinder operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Caller configuration ---
    #[error("No API key supplied: a credential is required to query the completion service")]
    MissingCredential,

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    // --- Transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single transport attempt (or a whole chain) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited by upstream, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Strategy '{strategy}' timed out after {timeout_ms}ms")]
    Timeout { strategy: String, timeout_ms: u64 },

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Response contained no text: {0}")]
    EmptyBody(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("All {attempts} transport strategies failed; last error: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// The innermost failure reason, unwrapping an `Exhausted` aggregate.
    pub fn last_reason(&self) -> &TransportError {
        match self {
            TransportError::Exhausted { last, .. } => last.last_reason(),
            other => other,
        }
    }

    /// Whether this failure came from the deadline firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self.last_reason(), TransportError::Timeout { .. })
    }
}
