//! `license-discovery` — find the license governing a project checkout or repository.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Install logging (`RUST_LOG`, `--verbose`).
//! 3. Load config ([`license_discovery::load_config`]) and the reference corpus.
//! 4. Run the discovery fallback chain ([`license_discovery::LicenseDiscovery`]).
//! 5. Render the requested report ([`report`]).
//! 6. Exit `0` (license found) or `1` (nothing found).

mod cli;
mod report;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use license_discovery::{load_config, Corpus, LicenseDiscovery};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let corpus_dir = cli.corpus.clone().or_else(|| config.corpus.dir.clone());
    let corpus = match &corpus_dir {
        Some(dir) => Corpus::from_dir(dir)
            .with_context(|| format!("loading corpus from {}", dir.display()))?,
        None => Corpus::bundled()?,
    };

    let discovery = LicenseDiscovery::new(Arc::new(corpus), config)?;

    let spinner = if !cli.quiet && matches!(cli.report, ReportFormat::Terminal) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message("Searching for license...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let found = discovery
        .search_license_file(
            &path,
            cli.url.as_deref(),
            cli.revision.as_deref(),
            cli.license_name.as_deref(),
        )
        .await?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(found.as_ref(), &path, cli.url.as_deref(), cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }

    if found.is_none() {
        std::process::exit(1);
    }

    Ok(())
}
