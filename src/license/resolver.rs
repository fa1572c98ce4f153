use std::sync::OnceLock;

use regex::Regex;

use crate::corpus::Corpus;
use crate::error::{DiscoveryError, Result};
use crate::license::similarity::{best_match, token_sort_key, BatchScorer};
use crate::models::LicenseRecord;

fn license_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s*\blicen[sc]e\b\s*").expect("valid license-word regex"))
}

/// Drop the word "License" (any case, either spelling) and collapse whitespace.
///
/// Reference names rarely carry it, so `"MIT License"` becomes `"MIT"`.
pub fn strip_license_word(name: &str) -> String {
    license_word()
        .replace_all(name.trim(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a free-form license name to a corpus record.
///
/// Exact (case-sensitive) lookup against ids, display names and aliases comes
/// first; otherwise the record owning the best token-sort match wins. On a
/// non-empty corpus this always yields a record, however poor the match.
pub fn resolve_license_name<'c>(corpus: &'c Corpus, raw_name: &str) -> Result<&'c LicenseRecord> {
    let records = corpus.records();
    if records.is_empty() {
        return Err(DiscoveryError::EmptyCorpus("license records"));
    }

    let name = strip_license_word(raw_name);

    if let Some(record) = records
        .iter()
        .find(|r| r.all_names().any(|n| n == name || strip_license_word(n) == name))
    {
        return Ok(record);
    }

    // Flatten every name of every record, remembering its owner.
    let choices: Vec<(usize, String)> = records
        .iter()
        .enumerate()
        .flat_map(|(idx, r)| {
            r.all_names()
                .map(move |n| (idx, token_sort_key(&strip_license_word(n))))
        })
        .collect();

    let scorer = BatchScorer::new(&token_sort_key(&name));
    let (winner, score) = best_match(&scorer, choices.iter().map(|(_, key)| key.as_str()))
        .ok_or(DiscoveryError::EmptyCorpus("license names"))?;
    let record = &records[choices[winner].0];

    tracing::debug!(
        "Resolved license name {:?} to {} (score {:.1})",
        raw_name,
        record.canonical_id,
        score
    );
    Ok(record)
}

/// Resolve `raw_name` and return its SPDX identifier, or the canonical id
/// when the record has none.
pub fn short_license_id(corpus: &Corpus, raw_name: &str) -> Result<String> {
    let record = resolve_license_name(corpus, raw_name)?;
    Ok(record
        .identifier_for("spdx")
        .unwrap_or(&record.canonical_id)
        .to_string())
}
