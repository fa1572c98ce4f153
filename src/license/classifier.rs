use std::path::Path;

use crate::corpus::Corpus;
use crate::error::{DiscoveryError, Result};
use crate::license::similarity::{best_match, token_sort_key, BatchScorer};

/// Minimum similarity (0–100) for a text match to beat a caller-supplied default.
pub const ACCEPTANCE_THRESHOLD: f64 = 76.0;

/// Best corpus entry for a piece of license text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate<'c> {
    pub license_id: &'c str,
    pub score: f64,
}

/// Score `raw_text` against every reference text and return the winner.
///
/// Ties go to the earliest corpus entry.
pub fn best_text_match<'c>(corpus: &'c Corpus, raw_text: &str) -> Result<MatchCandidate<'c>> {
    let prepared = corpus.prepared_texts();
    let scorer = BatchScorer::new(&token_sort_key(raw_text));
    let (idx, score) = best_match(&scorer, prepared.iter().map(String::as_str))
        .ok_or(DiscoveryError::EmptyCorpus("license texts"))?;
    Ok(MatchCandidate {
        license_id: corpus.text_id(idx),
        score,
    })
}

/// Classify license text with the standard [`ACCEPTANCE_THRESHOLD`].
pub fn classify_license_text(corpus: &Corpus, raw_text: &str, default: Option<&str>) -> Result<String> {
    classify_license_text_with_threshold(corpus, raw_text, default, ACCEPTANCE_THRESHOLD)
}

/// Classify license text against the corpus.
///
/// With a non-empty `default`, a winning score below `threshold` returns the
/// default instead of the corpus id. Without one, the best match is returned
/// whatever its score.
pub fn classify_license_text_with_threshold(
    corpus: &Corpus,
    raw_text: &str,
    default: Option<&str>,
    threshold: f64,
) -> Result<String> {
    let candidate = best_text_match(corpus, raw_text)?;
    match default.filter(|d| !d.is_empty()) {
        Some(default) if candidate.score < threshold => {
            tracing::debug!(
                "Best text match {} scored {:.1} < {}, using {}",
                candidate.license_id,
                candidate.score,
                threshold,
                default
            );
            Ok(default.to_string())
        }
        _ => Ok(candidate.license_id.to_string()),
    }
}

/// Read a license file as UTF-8 and classify it.
pub fn classify_license_file(
    corpus: &Corpus,
    path: &Path,
    default: Option<&str>,
    threshold: f64,
) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DiscoveryError::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|_| DiscoveryError::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    classify_license_text_with_threshold(corpus, &content, default, threshold)
}
