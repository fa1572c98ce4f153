//! License discovery: find and classify the license governing a project.
//!
//! # Fallback chain
//! 1. Resolve the declared license name, if any ([`resolver`](crate::license::resolver));
//!    it becomes the default for low-confidence text matches.
//! 2. Scan the local checkout ([`folder`]). A hit is packaged with the project.
//! 3. Ask the repository host's API ([`host_api`]).
//! 4. Shallow-clone the repository and scan it ([`clone`]).
//!
//! Each stage returns `Ok(None)` when it finds nothing or hits a transient
//! failure, so the chain simply moves on. Temporary files and directories
//! created by stages 3 and 4 are left on disk; removing them is up to the
//! caller.

pub mod clone;
pub mod folder;
pub mod host_api;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::DiscoveryConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::license::resolver::short_license_id;
use crate::models::ShortLicense;

use clone::RepoCloner;
use host_api::{HostApiClient, HostTransport, ReqwestTransport};

/// Rewrite a local hit to the packaged form: relative to `root`, `/`-separated,
/// and optionally without its first segment (`pkg-1.0/LICENSE` -> `LICENSE`).
pub fn packaged_location(root: &Path, location: &Path, strip_root_segment: bool) -> PathBuf {
    let relative = location.strip_prefix(root).unwrap_or(location);
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();

    if strip_root_segment && segments.len() > 1 {
        segments.remove(0);
    }
    PathBuf::from(segments.join("/"))
}

/// Runs the discovery fallback chain against a shared corpus.
pub struct LicenseDiscovery<T: HostTransport = ReqwestTransport> {
    corpus: Arc<Corpus>,
    config: DiscoveryConfig,
    host_api: HostApiClient<T>,
    cloner: RepoCloner,
}

impl LicenseDiscovery<ReqwestTransport> {
    pub fn new(corpus: Arc<Corpus>, config: DiscoveryConfig) -> Result<Self> {
        let host_api = HostApiClient::new(&config)?;
        Ok(Self::with_host_api(corpus, config, host_api))
    }
}

impl<T: HostTransport> LicenseDiscovery<T> {
    pub fn with_host_api(corpus: Arc<Corpus>, config: DiscoveryConfig, host_api: HostApiClient<T>) -> Self {
        let cloner = RepoCloner::new(config.network.clone_timeout());
        Self {
            corpus,
            config,
            host_api,
            cloner,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn host_api(&self) -> &HostApiClient<T> {
        &self.host_api
    }

    /// Find the license for a project.
    ///
    /// `root` is the local checkout (may be empty or missing), `remote_url`
    /// the repository used by the remote fallbacks, `revision` the tag or
    /// branch to query, and `declared_name` the license named in package
    /// metadata. Returns `Ok(None)` when no stage finds anything.
    pub async fn search_license_file(
        &self,
        root: &Path,
        remote_url: Option<&str>,
        revision: Option<&str>,
        declared_name: Option<&str>,
    ) -> Result<Option<ShortLicense>> {
        let default = match declared_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Some(short_license_id(&self.corpus, name)?),
            None => None,
        };
        let default = default.as_deref();

        if let Some(mut found) = self.search_license_folder(root, default)? {
            found.is_packaged = true;
            found.location =
                packaged_location(root, &found.location, self.config.discovery.strip_root_segment);
            return Ok(Some(found));
        }

        let Some(remote_url) = remote_url.filter(|u| !u.is_empty()) else {
            tracing::debug!("No license in {} and no remote to ask", root.display());
            return Ok(None);
        };

        if let Some(found) = self.fetch_license_via_host_api(remote_url, revision, default).await? {
            return Ok(Some(found));
        }

        self.search_license_via_clone(remote_url, revision, default).await
    }

    /// Scan a local folder; the result is not marked packaged.
    pub fn search_license_folder(&self, root: &Path, default: Option<&str>) -> Result<Option<ShortLicense>> {
        folder::search_license_folder(&self.corpus, root, default, self.config.discovery.threshold)
    }

    /// Ask the repository host's API (memoized per URL and revision).
    pub async fn fetch_license_via_host_api(
        &self,
        remote_url: &str,
        revision: Option<&str>,
        default: Option<&str>,
    ) -> Result<Option<ShortLicense>> {
        self.host_api.fetch_license(remote_url, revision, default).await
    }

    /// Shallow-clone the repository into a temp dir and scan it.
    pub async fn search_license_via_clone(
        &self,
        remote_url: &str,
        revision: Option<&str>,
        default: Option<&str>,
    ) -> Result<Option<ShortLicense>> {
        self.cloner
            .search_license(
                &self.corpus,
                remote_url,
                revision,
                default,
                self.config.discovery.threshold,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packaged_location_strips_root_segment() {
        let root = Path::new("/src");
        assert_eq!(
            packaged_location(root, Path::new("/src/pkg-1.0/LICENSE"), true),
            PathBuf::from("LICENSE")
        );
        assert_eq!(
            packaged_location(root, Path::new("/src/pkg-1.0/docs/COPYING"), true),
            PathBuf::from("docs/COPYING")
        );
        assert_eq!(
            packaged_location(root, Path::new("/src/LICENSE.txt"), true),
            PathBuf::from("LICENSE.txt")
        );
    }

    #[test]
    fn test_packaged_location_keeps_segment_when_disabled() {
        assert_eq!(
            packaged_location(Path::new("/src"), Path::new("/src/pkg-1.0/LICENSE"), false),
            PathBuf::from("pkg-1.0/LICENSE")
        );
    }
}
