//! Search engine
//!
//! A query is split into lowercase whitespace-separated terms. A dataset
//! matches when any term occurs as a substring of its indexed text, and
//! datasets matching more terms sort first.

use crate::models::Dataset;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        let mut terms: Vec<String> = Vec::new();
        for term in raw.split_whitespace().map(str::to_lowercase) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        Self { terms }
    }

    /// An empty query matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of distinct terms found in `indexed_text`.
    pub fn score(&self, indexed_text: &str) -> usize {
        self.terms.iter().filter(|term| indexed_text.contains(term.as_str())).count()
    }
}

/// Keep matching datasets, best match first.
///
/// Ties keep their input order, so callers pass candidates newest first.
pub fn rank(candidates: Vec<Dataset>, query: &SearchQuery) -> Vec<Dataset> {
    if query.is_empty() {
        return candidates;
    }

    let mut scored: Vec<(usize, Dataset)> = candidates
        .into_iter()
        .map(|dataset| (query.score(&dataset.indexed_text), dataset))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, dataset)| dataset).collect()
}
