//! Last-resort discovery: shallow-clone the repository and scan the checkout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::corpus::Corpus;
use crate::discovery::folder::search_license_folder;
use crate::error::{DiscoveryError, Result};
use crate::models::ShortLicense;

/// Turn a repository URL into something `git clone` accepts.
///
/// `https://github.com/org/repo/` and `https://github.com/org/repo` both
/// become `https://github.com/org/repo.git`.
pub fn clone_url(remote_url: &str) -> String {
    let url = remote_url.trim().trim_end_matches('/');
    if url.ends_with(".git") {
        url.to_string()
    } else {
        format!("{url}.git")
    }
}

/// Arguments for `git`: `clone --depth 1 [-b <revision>] <url> <dest>`.
pub fn git_clone_args(url: &str, revision: Option<&str>, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["clone".into(), "--depth".into(), "1".into()];
    if let Some(rev) = revision.filter(|r| !r.is_empty()) {
        args.push("-b".into());
        args.push(rev.into());
    }
    args.push(url.into());
    args.push(dest.into());
    args
}

/// Shallow-clones repositories into temporary directories.
#[derive(Debug, Clone)]
pub struct RepoCloner {
    timeout: Duration,
}

impl RepoCloner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Clone `remote_url` at `revision` into a fresh `license-clone-*` directory.
    ///
    /// On success the directory is kept and handed to the caller; on failure
    /// it is removed.
    pub async fn clone_to_temp(&self, remote_url: &str, revision: Option<&str>) -> Result<PathBuf> {
        let url = clone_url(remote_url);
        let dest = tempfile::Builder::new()
            .prefix("license-clone-")
            .tempdir()
            .map_err(|e| DiscoveryError::io(std::env::temp_dir(), e))?;

        tracing::info!("Shallow cloning {} → {}", url, dest.path().display());

        let output = Command::new("git")
            .args(git_clone_args(&url, revision, dest.path()))
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| DiscoveryError::Timeout {
                operation: "git clone",
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| DiscoveryError::Clone(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::Clone(stderr.trim().to_string()));
        }

        Ok(dest.keep())
    }

    /// Clone the repository and scan the checkout for a license file.
    ///
    /// Any clone failure (missing git, bad URL, unknown revision, timeout) is
    /// logged and reported as `Ok(None)`. Errors from scanning the checkout
    /// propagate.
    pub async fn search_license(
        &self,
        corpus: &Corpus,
        remote_url: &str,
        revision: Option<&str>,
        default: Option<&str>,
        threshold: f64,
    ) -> Result<Option<ShortLicense>> {
        let checkout = match self.clone_to_temp(remote_url, revision).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Could not clone {}: {}", remote_url, e);
                return Ok(None);
            }
        };
        search_license_folder(corpus, &checkout, default, threshold)
    }
}
