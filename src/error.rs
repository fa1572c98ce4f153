use std::path::PathBuf;

use thiserror::Error;

/// Failures that indicate misconfiguration or an unusable local environment.
///
/// Expected absence (no license anywhere, a 404 from the host, a failed clone)
/// is never an error: discovery stages report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("license file {} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("reference corpus has no {0}")]
    EmptyCorpus(&'static str),

    #[error("invalid corpus data in {}: {source}", path.display())]
    CorpusFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("git clone failed: {0}")]
    Clone(String),
}

impl DiscoveryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiscoveryError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = DiscoveryError> = std::result::Result<T, E>;
