use std::cmp::Ordering;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::license::classifier::classify_license_file;
use crate::models::ShortLicense;

fn license_file_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:copyright|licen[sc]e[s]*|copying|copyleft)\b")
            .expect("valid license file pattern")
    })
}

/// Whether a file name looks like a license file (`LICENSE`, `COPYING.txt`, `License-MIT`, ...).
///
/// The keyword must open the name and end on a word boundary, so
/// `publicity.txt` and `licensed-premises.txt` do not match.
pub fn is_license_file_name(file_name: &str) -> bool {
    license_file_pattern().is_match(file_name)
}

// Files before subdirectories, then by name: a top-level LICENSE wins.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

/// Walk `root` and classify the first license-looking file found.
///
/// The result is never marked packaged and its location is the full path;
/// the orchestrator rewrites both for local checkouts.
pub fn search_license_folder(
    corpus: &Corpus,
    root: &Path,
    default: Option<&str>,
    threshold: f64,
) -> Result<Option<ShortLicense>> {
    if !root.is_dir() {
        tracing::debug!("{} is not a directory, skipping folder scan", root.display());
        return Ok(None);
    }

    let walker = WalkDir::new(root)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|e| !is_git_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }
        if !is_license_file_name(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let name = classify_license_file(corpus, entry.path(), default, threshold)?;
        tracing::info!("Found license file {} ({})", entry.path().display(), name);
        return Ok(Some(ShortLicense::new(name, entry.path())));
    }

    Ok(None)
}
