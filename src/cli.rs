use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-discovery",
    about = "Discover and classify the license governing a project",
    version
)]
pub struct Cli {
    /// Local checkout or unpacked source tree to search
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Repository URL used when no license is found locally
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Tag or branch to query on the remote
    #[arg(long, value_name = "REV")]
    pub revision: Option<String>,

    /// License name declared in package metadata (e.g. "Apache License 2.0")
    #[arg(long = "license-name", value_name = "NAME")]
    pub license_name: Option<String>,

    /// Config file [default: ./.license-discovery/config.toml, fallback ~/.config/license-discovery/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference corpus directory (licenses.json + text/*.txt); overrides config
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the license identifier
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
