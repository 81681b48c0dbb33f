//! The SchemeFinder retrieval pipeline.
//!
//! [`RetrievalOrchestrator::retrieve`] is the single entry point callers
//! need: it projects the profile into a prompt, drives the transport chain,
//! extracts records from the answer, and falls back to synthesized records
//! whenever the real answer is unusable.

pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod signals;
pub mod synth;

pub use extract::{ExtractError, extract};
pub use orchestrator::{RequestSettings, RetrievalOrchestrator};
pub use prompt::project;
pub use signals::ProfileSignals;
pub use synth::synthesize;
