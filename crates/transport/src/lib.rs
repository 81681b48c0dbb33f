//! Transport strategies for SchemeFinder.
//!
//! All strategies implement the `schemefinder_core::Transport` trait.
//! The chain tries them in configured order until one returns text.

pub mod builder;
pub mod chain;
pub mod direct;
pub mod legacy;
pub mod relay;
pub mod wire;

pub use builder::build_from_config;
pub use chain::TransportChain;
pub use direct::DirectTransport;
pub use legacy::LegacyTransport;
pub use relay::RelayTransport;
