//! Builds a transport chain from configuration.

use std::sync::Arc;
use std::time::Duration;

use schemefinder_config::{AppConfig, StrategyConfig};
use schemefinder_core::error::TransportError;
use schemefinder_core::transport::Transport;

use crate::chain::TransportChain;
use crate::direct::DirectTransport;
use crate::legacy::LegacyTransport;
use crate::relay::RelayTransport;

/// Instantiate one strategy from its config entry.
pub fn build_strategy(config: &StrategyConfig) -> Result<Arc<dyn Transport>, TransportError> {
    let transport: Arc<dyn Transport> = match config {
        StrategyConfig::Relay { url, .. } => Arc::new(RelayTransport::new(url)?),
        StrategyConfig::Direct { base_url, .. } => {
            Arc::new(DirectTransport::new()?.with_base_url(base_url))
        }
        StrategyConfig::Legacy {
            base_url,
            timeout_secs,
        } => Arc::new(
            LegacyTransport::new(base_url)
                .with_request_timeout(Duration::from_secs(*timeout_secs)),
        ),
    };
    Ok(transport)
}

/// Build the chain in configured order, each with its configured deadline.
pub fn build_from_config(config: &AppConfig) -> Result<TransportChain, TransportError> {
    config
        .transport
        .strategies
        .iter()
        .try_fold(TransportChain::new(), |chain, strategy| {
            let transport = build_strategy(strategy)?;
            Ok(chain.add(transport, Duration::from_secs(strategy.timeout_secs())))
        })
}
