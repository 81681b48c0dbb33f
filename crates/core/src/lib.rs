//! # SchemeFinder Core
//!
//! Domain types, traits, and error definitions for the SchemeFinder
//! eligibility pipeline. This crate has **no HTTP dependencies**: it defines
//! the model that the transport, retrieval, and gateway crates build on.
//!
//! ## Layout
//!
//! - [`profile`]: the caller's submitted attributes
//! - [`record`]: eligibility records and the outcome handed back to callers
//! - [`transport`]: the `Transport` trait every delivery strategy implements
//! - [`cancel`]: the cancellation signal passed into each transport attempt

pub mod cancel;
pub mod error;
pub mod profile;
pub mod record;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use cancel::CancellationToken;
pub use error::{Error, Result, TransportError};
pub use profile::Profile;
pub use record::{EligibilityRecord, RetrievalOutcome};
pub use transport::{ChatMessage, CompletionRequest, Credential, Transport};
