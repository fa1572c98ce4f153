//! Token-order-insensitive string similarity on a 0–100 scale.
//!
//! Both inputs are reduced to a sort key (lowercased alphanumeric tokens,
//! sorted, single-space joined) and compared with the normalized Indel
//! similarity, so word order, punctuation and whitespace do not matter.

use rapidfuzz::distance::indel;

/// Reduce `s` to its token-sort key.
pub fn token_sort_key(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Scores one prepared query against many prepared candidates.
pub struct BatchScorer {
    query_is_empty: bool,
    comparator: indel::BatchComparator<char>,
}

impl BatchScorer {
    pub fn new(prepared_query: &str) -> Self {
        Self {
            query_is_empty: prepared_query.is_empty(),
            comparator: indel::BatchComparator::new(prepared_query.chars()),
        }
    }

    pub fn score(&self, prepared_candidate: &str) -> f64 {
        if self.query_is_empty || prepared_candidate.is_empty() {
            return 0.0;
        }
        self.comparator
            .normalized_similarity(prepared_candidate.chars())
            * 100.0
    }
}

/// Index and score of the highest-scoring candidate; the earliest wins ties.
pub fn best_match<'a, I>(scorer: &BatchScorer, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let score = scorer.score(candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}
