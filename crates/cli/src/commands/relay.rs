//! `schemefinder relay` — Start the relay and eligibility server.

use schemefinder_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🏛️  SchemeFinder Relay");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Upstream:  {}", config.gateway.upstream_url);

    schemefinder_gateway::start(config).await?;

    Ok(())
}
