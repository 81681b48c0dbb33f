//! `schemefinder doctor` — Diagnose configuration.

use schemefinder_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 SchemeFinder Doctor — Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `schemefinder onboard`)");
        issues += 1;
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ⚠️  No API key — set SCHEMEFINDER_API_KEY or api_key in config.toml");
                issues += 1;
            }

            println!("  Model: {}", config.model);
            println!("  Transport chain:");
            for (i, strategy) in config.transport.strategies.iter().enumerate() {
                println!(
                    "    {}. {:<6} {} ({}s)",
                    i + 1,
                    strategy.kind(),
                    strategy.url(),
                    strategy.timeout_secs()
                );
            }

            if let Err(e) = schemefinder_transport::build_from_config(&config) {
                println!("  ❌ Transport chain could not be built: {e}");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
