use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use license_discovery::discovery::host_api::{
    HostApiClient, HostLicenseMeta, HostLicensePayload, HostTransport,
};
use license_discovery::{Corpus, DiscoveryConfig, LicenseDiscovery, Result, ShortLicense};

const MIT_TEXT: &str = include_str!("../data/text/MIT.txt");

/// Host transport that serves one canned answer and counts requests.
struct CountingTransport {
    calls: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
    payload: Option<HostLicensePayload>,
    delay: Duration,
}

#[async_trait]
impl HostTransport for CountingTransport {
    async fn fetch_license(&self, url: &str) -> Result<Option<HostLicensePayload>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        tokio::time::sleep(self.delay).await;
        Ok(self.payload.clone())
    }
}

fn mit_payload() -> HostLicensePayload {
    HostLicensePayload {
        content: base64::engine::general_purpose::STANDARD.encode(MIT_TEXT),
        license: Some(HostLicenseMeta {
            spdx_id: Some("MIT".to_string()),
        }),
    }
}

fn discovery_with(
    payload: Option<HostLicensePayload>,
    delay: Duration,
) -> (LicenseDiscovery<CountingTransport>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = DiscoveryConfig::default();
    let transport = CountingTransport {
        calls: calls.clone(),
        urls: Arc::new(Mutex::new(Vec::new())),
        payload,
        delay,
    };
    let host_api = HostApiClient::with_transport(transport, config.host_api.hosts.clone());
    let corpus = Arc::new(Corpus::bundled().unwrap());
    (LicenseDiscovery::with_host_api(corpus, config, host_api), calls)
}

fn cleanup(found: &ShortLicense, levels: usize) {
    let mut dir: &Path = &found.location;
    for _ in 0..levels {
        dir = dir.parent().unwrap();
    }
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_local_license_is_packaged_and_relative() {
    let (discovery, calls) = discovery_with(None, Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("LICENSE.txt"), MIT_TEXT).unwrap();

    let found = discovery
        .search_license_file(dir.path(), Some("https://github.com/org/repo"), None, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        found,
        ShortLicense {
            name: "MIT".to_string(),
            location: PathBuf::from("LICENSE.txt"),
            is_packaged: true,
        }
    );
    // Local hit short-circuits the remote stages.
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_local_gpl_copying_is_not_mislabeled() {
    let (discovery, _) = discovery_with(None, Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("COPYING"),
        include_str!("../data/text/GPL-3.0.txt"),
    )
    .unwrap();

    let found = discovery
        .search_license_file(dir.path(), None, None, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "GPL-3.0");
    assert_eq!(found.location, PathBuf::from("COPYING"));
    assert!(found.is_packaged);
}

#[tokio::test]
async fn test_sdist_layout_strips_root_directory() {
    let (discovery, _) = discovery_with(None, Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("example-1.2.3");
    std::fs::create_dir(&project).unwrap();
    std::fs::write(project.join("setup.py"), "").unwrap();
    std::fs::write(project.join("LICENSE"), MIT_TEXT).unwrap();

    let found = discovery
        .search_license_file(dir.path(), None, None, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.location, PathBuf::from("LICENSE"));
    assert!(found.is_packaged);
}

#[tokio::test]
async fn test_empty_folder_without_remote_is_none() {
    let (discovery, calls) = discovery_with(Some(mit_payload()), Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();

    let found = discovery
        .search_license_file(dir.path(), None, None, Some("MIT"))
        .await
        .unwrap();
    assert!(found.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_declared_name_is_default_for_weak_matches() {
    let (discovery, _) = discovery_with(None, Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("COPYING"),
        "See the project homepage for licensing details.",
    )
    .unwrap();

    let found = discovery
        .search_license_file(dir.path(), None, None, Some("Apache License 2.0"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Apache-2.0");
    assert_eq!(found.location, PathBuf::from("COPYING"));
}

#[tokio::test]
async fn test_host_api_fallback_is_memoized() {
    let (discovery, calls) = discovery_with(Some(mit_payload()), Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();

    let first = discovery
        .search_license_file(dir.path(), Some("https://github.com/org/repo"), Some("v1.0"), None)
        .await
        .unwrap()
        .unwrap();
    let second = discovery
        .search_license_file(dir.path(), Some("https://github.com/org/repo"), Some("v1.0"), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.name, "MIT");
    assert!(!first.is_packaged);
    assert_eq!(std::fs::read_to_string(&first.location).unwrap(), MIT_TEXT);
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        discovery.host_api().cache().get("https://github.com/org/repo", Some("v1.0")),
        Some(Some(first.clone()))
    );

    cleanup(&first, 1);
}

#[tokio::test]
async fn test_host_api_request_urls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let urls = Arc::new(Mutex::new(Vec::new()));
    let client = HostApiClient::with_transport(
        CountingTransport {
            calls: calls.clone(),
            urls: urls.clone(),
            payload: None,
            delay: Duration::ZERO,
        },
        DiscoveryConfig::default().host_api.hosts,
    );

    client.fetch_license("https://github.com/org/repo", None, None).await.unwrap();
    client.fetch_license("https://github.com/org/repo", Some("main"), None).await.unwrap();
    client.fetch_license("https://github.com/org/repo", None, None).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *urls.lock().unwrap(),
        vec![
            "https://api.github.com/repos/org/repo/license".to_string(),
            "https://api.github.com/repos/org/repo/license?ref=main".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_request() {
    let (discovery, calls) = discovery_with(Some(mit_payload()), Duration::from_millis(50));

    let (a, b) = tokio::join!(
        discovery.fetch_license_via_host_api("https://github.com/org/repo", None, None),
        discovery.fetch_license_via_host_api("https://github.com/org/repo", None, None),
    );
    let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());
    assert_eq!(a, b);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cleanup(&a, 1);
}

#[tokio::test]
async fn test_failed_remote_stages_yield_none() {
    let (discovery, _) = discovery_with(None, Duration::ZERO);
    let dir = tempfile::tempdir().unwrap();
    let missing_repo = dir.path().join("nowhere").join("repo");

    let found = discovery
        .search_license_file(
            dir.path(),
            Some(&missing_repo.display().to_string()),
            Some("v9.9.9"),
            None,
        )
        .await
        .unwrap();
    assert!(found.is_none());
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {:?} failed", args);
}

#[tokio::test]
async fn test_clone_fallback_scans_checkout() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let (discovery, calls) = discovery_with(None, Duration::ZERO);
    let upstream = tempfile::tempdir().unwrap();
    let repo = upstream.path().join("project.git");
    std::fs::create_dir(&repo).unwrap();
    git(&repo, &["init", "-q"]);
    std::fs::write(repo.join("LICENSE"), MIT_TEXT).unwrap();
    git(&repo, &["add", "LICENSE"]);
    git(&repo, &["commit", "-q", "-m", "init"]);

    let local = tempfile::tempdir().unwrap();
    // Trailing slash is normalized to the `.git` URL.
    let url = format!("{}/", upstream.path().join("project").display());
    let found = discovery
        .search_license_file(local.path(), Some(&url), None, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.name, "MIT");
    assert!(!found.is_packaged);
    assert!(found.location.is_file());
    assert!(found
        .location
        .parent()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("license-clone-"));
    // File URLs have no host API mapping.
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    cleanup(&found, 1);
}

#[test]
fn test_unmapped_hosts_config() {
    let mut hosts = BTreeMap::new();
    hosts.insert("git.example.com".to_string(), "git.example.com/api/v1/repos".to_string());
    assert_eq!(
        license_discovery::discovery::host_api::host_api_url(&hosts, "https://git.example.com/a/b", None)
            .unwrap(),
        "https://git.example.com/api/v1/repos/a/b/license"
    );
}
