//! `schemefinder onboard` — First-time setup.

use schemefinder_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("🏛️  SchemeFinder — First-Time Setup");
    println!("==================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Add api_key to {} (or export SCHEMEFINDER_API_KEY)", config_path.display());
        println!("   2. Run: schemefinder relay");
        println!("   3. Run: schemefinder check --state <S> --gender <G> --income <N> --age <N>\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
