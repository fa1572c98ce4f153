use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DiscoveryError, Result};
use crate::license::classifier::ACCEPTANCE_THRESHOLD;

/// Root configuration structure, deserialized from `.license-discovery/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub discovery: DiscoverySettings,
    pub network: NetworkSettings,
    pub corpus: CorpusSettings,
    pub host_api: HostApiSettings,
}

/// How local matches are scored and reported.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Minimum text similarity (0–100) before the declared license wins instead.
    pub threshold: f64,
    /// Drop the first path segment of packaged license locations.
    ///
    /// Matches the sdist/tarball layout where the search root sits one level
    /// above the project root (`pkg-1.0/LICENSE` -> `LICENSE`).
    pub strip_root_segment: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            threshold: ACCEPTANCE_THRESHOLD,
            strip_root_segment: true,
        }
    }
}

/// Bounds on network and subprocess work.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub clone_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            clone_timeout_secs: 120,
            user_agent: format!("license-discovery/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

/// Where the reference corpus comes from. `None` uses the bundled corpus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub dir: Option<PathBuf>,
}

/// Repository host -> API base substitutions, e.g. `github.com` -> `api.github.com/repos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostApiSettings {
    pub hosts: BTreeMap<String, String>,
}

impl Default for HostApiSettings {
    fn default() -> Self {
        let mut hosts = BTreeMap::new();
        hosts.insert("github.com".to_string(), "api.github.com/repos".to_string());
        Self { hosts }
    }
}

fn read_config(path: &Path) -> Result<DiscoveryConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::io(path, e))?;
    toml::from_str(&content).map_err(|source| DiscoveryError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-discovery/config.toml`
/// 3. `~/.config/license-discovery/config.toml`
/// 4. Built-in [`DiscoveryConfig::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<DiscoveryConfig> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-discovery").join("config.toml");
    if project_config.exists() {
        tracing::debug!("Loading config from {}", project_config.display());
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-discovery")
            .join("config.toml");
        if home_config.exists() {
            tracing::debug!("Loading config from {}", home_config.display());
            return read_config(&home_config);
        }
    }

    Ok(DiscoveryConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DiscoveryConfig::default();
        assert_eq!(cfg.discovery.threshold, 76.0);
        assert!(cfg.discovery.strip_root_segment);
        assert_eq!(cfg.network.timeout(), Duration::from_secs(30));
        assert_eq!(
            cfg.host_api.hosts.get("github.com").map(String::as_str),
            Some("api.github.com/repos")
        );
        assert!(cfg.corpus.dir.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg: DiscoveryConfig = toml::from_str(
            r#"
[discovery]
strip_root_segment = false

[network]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert!(!cfg.discovery.strip_root_segment);
        assert_eq!(cfg.discovery.threshold, 76.0);
        assert_eq!(cfg.network.timeout_secs, 5);
        assert_eq!(cfg.network.clone_timeout_secs, 120);
        assert!(cfg.host_api.hosts.contains_key("github.com"));
    }

    #[test]
    fn test_project_config_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".license-discovery");
        std::fs::create_dir(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[host_api.hosts]\n\"gitlab.example.com\" = \"gitlab.example.com/api/v4/projects\"\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        // An explicit table replaces the default host list.
        assert_eq!(cfg.host_api.hosts.len(), 1);
        assert!(cfg.host_api.hosts.contains_key("gitlab.example.com"));
    }

    #[test]
    fn test_override_with_bad_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[discovery\nthreshold = ").unwrap();
        assert!(matches!(
            load_config(dir.path(), Some(&path)),
            Err(DiscoveryError::Config { .. })
        ));
    }
}
