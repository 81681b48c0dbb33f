//! SchemeFinder CLI — the main entry point.
//!
//! Commands:
//! - `check`    — Find schemes a profile may be eligible for
//! - `prompt`   — Print the prompt a profile projects to
//! - `relay`    — Start the HTTP relay and eligibility server
//! - `onboard`  — Initialize config
//! - `doctor`   — Diagnose configuration

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "schemefinder",
    about = "SchemeFinder — government scheme eligibility lookup",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

/// The four attributes a lookup is keyed on.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// State or union territory of residence
    #[arg(long)]
    pub state: String,

    /// Gender as entered by the user
    #[arg(long)]
    pub gender: String,

    /// Annual income in rupees
    #[arg(long)]
    pub income: u64,

    /// Age in years
    #[arg(long)]
    pub age: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find schemes matching a profile
    Check {
        #[command(flatten)]
        profile: ProfileArgs,

        /// API key (overrides config and environment)
        #[arg(long, env = "SCHEMEFINDER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt sent for a profile
    Prompt {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Start the relay and eligibility HTTP server
    Relay {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize configuration
    Onboard,

    /// Diagnose configuration
    Doctor,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Check {
            profile,
            api_key,
            json,
        } => commands::check::run(profile, api_key, json).await?,
        Commands::Prompt { profile } => commands::prompt::run(profile)?,
        Commands::Relay { port } => commands::relay::run(port).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
