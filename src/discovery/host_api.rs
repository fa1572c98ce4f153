//! License lookup through a repository host's REST API (GitHub-style
//! `GET /repos/{owner}/{repo}/license`).
//!
//! Responses are memoized per `(repository URL, revision)` in a
//! [`HostLicenseCache`] owned by the client. The cache is unbounded and lives
//! as long as the client (or whoever else holds the `Arc`); call
//! [`HostLicenseCache::clear`] to reset it.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::{DiscoveryConfig, NetworkSettings};
use crate::error::{DiscoveryError, Result};
use crate::models::ShortLicense;

/// Identifier used when neither the host nor the caller names the license.
pub const FALLBACK_LICENSE_NAME: &str = "Other";

/// Body of a successful license endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct HostLicensePayload {
    /// Base64 license file content, possibly wrapped with newlines.
    pub content: String,
    #[serde(default)]
    pub license: Option<HostLicenseMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostLicenseMeta {
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// Performs the single GET the host API client needs.
#[async_trait]
pub trait HostTransport: Send + Sync {
    /// Fetch and decode the license endpoint.
    ///
    /// Returns `Ok(None)` for any status other than 200 OK and `Err` for
    /// transport failures (DNS, timeout, undecodable body).
    async fn fetch_license(&self, url: &str) -> Result<Option<HostLicensePayload>>;
}

/// [`HostTransport`] backed by a `reqwest` client with a request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HostTransport for ReqwestTransport {
    async fn fetch_license(&self, url: &str) -> Result<Option<HostLicensePayload>> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!("{} returned {}", url, response.status());
            return Ok(None);
        }

        Ok(Some(response.json::<HostLicensePayload>().await?))
    }
}

type CacheKey = (String, Option<String>);

/// Memoized host API results keyed by `(repository URL, revision)`.
///
/// Each key is resolved at most once, even under concurrent lookups. Both
/// hits and "no license" outcomes are stored; transport failures are not.
#[derive(Debug, Default)]
pub struct HostLicenseCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<Option<ShortLicense>>>>>,
}

impl HostLicenseCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: CacheKey) -> Arc<OnceCell<Option<ShortLicense>>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_default().clone()
    }

    /// Cached outcome for a key, if it has been resolved.
    pub fn get(&self, repo_url: &str, revision: Option<&str>) -> Option<Option<ShortLicense>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(repo_url.to_string(), revision.map(str::to_string)))
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Build the license endpoint for a human-facing repository URL.
///
/// `https://github.com/org/repo` becomes
/// `https://api.github.com/repos/org/repo/license`, with `?ref=<revision>`
/// appended (form-encoded) when a revision is given. Returns `None` for
/// hosts without an API mapping.
pub fn host_api_url(
    hosts: &BTreeMap<String, String>,
    repo_url: &str,
    revision: Option<&str>,
) -> Option<String> {
    let trimmed = repo_url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let (scheme, rest) = trimmed.split_once("://").unwrap_or(("https", trimmed));
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    let api_base = hosts.get(&host.to_ascii_lowercase())?;

    let mut endpoint = format!("{scheme}://{api_base}");
    if !path.is_empty() {
        endpoint.push('/');
        endpoint.push_str(path);
    }
    endpoint.push_str("/license");

    let mut url = match reqwest::Url::parse(&endpoint) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Cannot build API URL from {}: {}", repo_url, e);
            return None;
        }
    };
    if let Some(rev) = revision.filter(|r| !r.is_empty()) {
        url.query_pairs_mut().append_pair("ref", rev);
    }
    Some(url.into())
}

fn decode_content(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn license_name(payload: &HostLicensePayload, default: Option<&str>) -> String {
    payload
        .license
        .as_ref()
        .and_then(|meta| meta.spdx_id.as_deref())
        .filter(|id| !id.is_empty() && *id != "NOASSERTION")
        .or(default.filter(|d| !d.is_empty()))
        .unwrap_or(FALLBACK_LICENSE_NAME)
        .to_string()
}

/// Queries a repository host's license endpoint, caching each answer.
pub struct HostApiClient<T: HostTransport = ReqwestTransport> {
    transport: T,
    hosts: BTreeMap<String, String>,
    cache: Arc<HostLicenseCache>,
}

impl HostApiClient<ReqwestTransport> {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self::with_transport(
            ReqwestTransport::new(&config.network)?,
            config.host_api.hosts.clone(),
        ))
    }
}

impl<T: HostTransport> HostApiClient<T> {
    pub fn with_transport(transport: T, hosts: BTreeMap<String, String>) -> Self {
        Self {
            transport,
            hosts,
            cache: Arc::new(HostLicenseCache::new()),
        }
    }

    /// Share an existing cache instead of the client's own.
    pub fn with_cache(mut self, cache: Arc<HostLicenseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<HostLicenseCache> {
        &self.cache
    }

    /// Look up the license of `repo_url` at `revision` via the host API.
    ///
    /// The content is written to a fresh `license-host-api-*` temp directory
    /// that is left in place for the caller. The host's SPDX id is trusted
    /// as-is; `default` only fills in when the host reports none.
    ///
    /// The cache is keyed by `(repo_url, revision)` alone. When the host
    /// reports no SPDX id, the name stored is the *first* caller's `default`,
    /// and later callers get that name whatever default they pass.
    ///
    /// Network failures are logged and reported as `Ok(None)` without being
    /// cached, so the next call asks again. Other errors propagate.
    pub async fn fetch_license(
        &self,
        repo_url: &str,
        revision: Option<&str>,
        default: Option<&str>,
    ) -> Result<Option<ShortLicense>> {
        let slot = self
            .cache
            .slot((repo_url.to_string(), revision.map(str::to_string)));

        match slot
            .get_or_try_init(|| self.query(repo_url, revision, default))
            .await
        {
            Ok(found) => Ok(found.clone()),
            Err(e @ (DiscoveryError::Http(_) | DiscoveryError::Timeout { .. })) => {
                tracing::warn!("License lookup for {} failed: {}", repo_url, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn query(
        &self,
        repo_url: &str,
        revision: Option<&str>,
        default: Option<&str>,
    ) -> Result<Option<ShortLicense>> {
        let Some(url) = host_api_url(&self.hosts, repo_url, revision) else {
            tracing::debug!("No host API mapping for {}", repo_url);
            return Ok(None);
        };

        tracing::debug!("Querying {}", url);
        let Some(payload) = self.transport.fetch_license(&url).await? else {
            return Ok(None);
        };

        let Some(content) = decode_content(&payload.content) else {
            tracing::warn!("{} returned license content that is not base64 UTF-8", url);
            return Ok(None);
        };

        let location = write_license(&content).await?;
        let name = license_name(&payload, default);
        tracing::info!("Host API reported {} for {}", name, repo_url);
        Ok(Some(ShortLicense::new(name, location)))
    }
}

async fn write_license(content: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("license-host-api-")
        .tempdir()
        .map_err(|e| DiscoveryError::io(std::env::temp_dir(), e))?;
    let path = dir.path().join("LICENSE");
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| DiscoveryError::io(&path, e))?;
    Ok(dir.keep().join("LICENSE"))
}
