//! `schemefinder check` — look up schemes for one profile.

use schemefinder_config::AppConfig;
use schemefinder_core::{Profile, RetrievalOutcome};
use schemefinder_retrieval::RetrievalOrchestrator;
use tracing::debug;

use crate::ProfileArgs;

pub async fn run(
    args: ProfileArgs,
    api_key: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(key) = api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.api_key.clone())
    else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Pass --api-key, or set one of these environment variables:");
        eprintln!("    SCHEMEFINDER_API_KEY");
        eprintln!("    ANTHROPIC_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let profile = Profile::new(args.state, args.gender, args.income, args.age)?;
    let orchestrator = RetrievalOrchestrator::from_config(&config)?;
    debug!(strategies = ?orchestrator.chain().names(), model = %config.model, "Transport chain ready");

    if !json {
        eprint!("  Searching schemes...");
    }
    let outcome = orchestrator.retrieve(&profile, &key).await?;
    if !json {
        eprint!("\r                      \r");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render(&profile, &outcome));
    }

    Ok(())
}

/// Human-readable listing of an outcome.
pub fn render(profile: &Profile, outcome: &RetrievalOutcome) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n  Schemes for {} / {} / ₹{} / {} years\n\n",
        profile.state(),
        profile.gender(),
        profile.income(),
        profile.age()
    ));

    if let Some(diagnostic) = &outcome.diagnostic {
        out.push_str(&format!("  ⚠️  {diagnostic}\n\n"));
    }

    for (i, record) in outcome.records.iter().enumerate() {
        out.push_str(&format!("  {}. {} [{}]\n", i + 1, record.name, record.category));
        if !record.description.is_empty() {
            out.push_str(&format!("     {}\n", record.description));
        }
        for criterion in &record.eligibility_criteria {
            out.push_str(&format!("     • {criterion}\n"));
        }
        if let Some(process) = &record.application_process {
            out.push_str(&format!("     How to apply: {process}\n"));
        }
        if !record.link.is_empty() {
            out.push_str(&format!("     {}\n", record.link));
        }
        out.push('\n');
    }

    out
}
