//! Reference corpus: canonical license records and their reference texts.
//!
//! The corpus is read-only after construction and shared by every discovery
//! run, usually behind an `Arc`. Records follow the opensource.org license API
//! shape (`id`, `name`, `other_names`, `identifiers`); texts are plain files
//! named after their canonical id.

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{DiscoveryError, Result};
use crate::license::similarity::token_sort_key;
use crate::models::{Identifier, LicenseRecord};

const BUNDLED_RECORDS: &str = include_str!("../data/licenses.json");

const BUNDLED_TEXTS: &[(&str, &str)] = &[
    ("0BSD", include_str!("../data/text/0BSD.txt")),
    ("AGPL-3.0", include_str!("../data/text/AGPL-3.0.txt")),
    ("Apache-2.0", include_str!("../data/text/Apache-2.0.txt")),
    ("Artistic-2.0", include_str!("../data/text/Artistic-2.0.txt")),
    ("BSD-2-Clause", include_str!("../data/text/BSD-2-Clause.txt")),
    ("BSD-3-Clause", include_str!("../data/text/BSD-3-Clause.txt")),
    ("BSL-1.0", include_str!("../data/text/BSL-1.0.txt")),
    ("CC0-1.0", include_str!("../data/text/CC0-1.0.txt")),
    ("EPL-2.0", include_str!("../data/text/EPL-2.0.txt")),
    ("GPL-2.0", include_str!("../data/text/GPL-2.0.txt")),
    ("GPL-3.0", include_str!("../data/text/GPL-3.0.txt")),
    ("ISC", include_str!("../data/text/ISC.txt")),
    ("LGPL-2.1", include_str!("../data/text/LGPL-2.1.txt")),
    ("LGPL-3.0", include_str!("../data/text/LGPL-3.0.txt")),
    ("MIT", include_str!("../data/text/MIT.txt")),
    ("MIT-0", include_str!("../data/text/MIT-0.txt")),
    ("MPL-2.0", include_str!("../data/text/MPL-2.0.txt")),
    ("Python-2.0", include_str!("../data/text/Python-2.0.txt")),
    ("Unlicense", include_str!("../data/text/Unlicense.txt")),
    ("WTFPL", include_str!("../data/text/WTFPL.txt")),
    ("Zlib", include_str!("../data/text/Zlib.txt")),
];

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    other_names: Vec<RawOtherName>,
    #[serde(default)]
    identifiers: Vec<Identifier>,
}

#[derive(Debug, Deserialize)]
struct RawOtherName {
    name: String,
}

impl From<RawRecord> for LicenseRecord {
    fn from(raw: RawRecord) -> Self {
        let mut alias_names: Vec<String> = Vec::with_capacity(raw.other_names.len());
        for other in raw.other_names {
            if !alias_names.contains(&other.name) {
                alias_names.push(other.name);
            }
        }
        LicenseRecord {
            canonical_id: raw.id,
            display_name: raw.name,
            alias_names,
            identifiers: raw.identifiers,
            reference_text: None,
        }
    }
}

/// Immutable, ordered collection of license records and reference texts.
#[derive(Debug)]
pub struct Corpus {
    records: Vec<LicenseRecord>,
    texts: Vec<(String, String)>,
    /// Token-sorted form of each text, built on first classification.
    prepared: OnceLock<Vec<String>>,
}

impl Corpus {
    /// Build a corpus from in-memory records and `(canonical_id, text)` pairs.
    ///
    /// Records whose id has a text get it attached as `reference_text`.
    pub fn new(mut records: Vec<LicenseRecord>, texts: Vec<(String, String)>) -> Self {
        for record in &mut records {
            if record.reference_text.is_none() {
                record.reference_text = texts
                    .iter()
                    .find(|(id, _)| *id == record.canonical_id)
                    .map(|(_, text)| text.clone());
            }
        }
        Corpus {
            records,
            texts,
            prepared: OnceLock::new(),
        }
    }

    /// The corpus compiled into the crate.
    pub fn bundled() -> Result<Self> {
        let raw: Vec<RawRecord> = serde_json::from_str(BUNDLED_RECORDS).map_err(|source| {
            DiscoveryError::CorpusFormat {
                path: "data/licenses.json".into(),
                source,
            }
        })?;
        let records = raw.into_iter().map(LicenseRecord::from).collect();
        let texts = BUNDLED_TEXTS
            .iter()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect();
        Ok(Corpus::new(records, texts))
    }

    /// Load `dir/licenses.json` and every `dir/text/*.txt`.
    ///
    /// Text files are ordered by file name; the file stem is the canonical id.
    /// Files prefixed with `deprecated_` are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let records_path = dir.join("licenses.json");
        let content = std::fs::read_to_string(&records_path)
            .map_err(|e| DiscoveryError::io(&records_path, e))?;
        let raw: Vec<RawRecord> =
            serde_json::from_str(&content).map_err(|source| DiscoveryError::CorpusFormat {
                path: records_path.clone(),
                source,
            })?;
        let records: Vec<LicenseRecord> = raw.into_iter().map(LicenseRecord::from).collect();

        let text_dir = dir.join("text");
        let mut texts = Vec::new();
        if text_dir.is_dir() {
            let mut paths: Vec<_> = std::fs::read_dir(&text_dir)
                .map_err(|e| DiscoveryError::io(&text_dir, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            paths.sort();

            for path in paths {
                let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if id.starts_with("deprecated_") {
                    continue;
                }
                let text =
                    std::fs::read_to_string(&path).map_err(|e| DiscoveryError::io(&path, e))?;
                texts.push((id.to_string(), text));
            }
        }

        tracing::debug!(
            "Loaded corpus from {} ({} records, {} texts)",
            dir.display(),
            records.len(),
            texts.len()
        );
        Ok(Corpus::new(records, texts))
    }

    /// Ordered `(canonical_id, reference_text)` pairs.
    pub fn all_licenses(&self) -> impl Iterator<Item = (&str, &str)> {
        self.texts.iter().map(|(id, text)| (id.as_str(), text.as_str()))
    }

    /// Ordered license records used for name resolution.
    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    /// Look up a record by its exact canonical id.
    pub fn get(&self, canonical_id: &str) -> Option<&LicenseRecord> {
        self.records.iter().find(|r| r.canonical_id == canonical_id)
    }

    pub(crate) fn text_id(&self, index: usize) -> &str {
        &self.texts[index].0
    }

    pub(crate) fn prepared_texts(&self) -> &[String] {
        self.prepared
            .get_or_init(|| self.texts.iter().map(|(_, t)| token_sort_key(t)).collect())
    }
}
