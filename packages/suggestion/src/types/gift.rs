//! Candidate and suggestion records.

use serde::{Deserialize, Serialize};

/// A gift candidate after normalization but before server-side scoring.
///
/// Produced from untrusted model output: every field has already been
/// coerced to a usable type, but the score and tags are still the model's
/// own suggestions and are treated as advisory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub description: String,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    /// Model-suggested confidence in [0, 1]; blended at low weight.
    pub match_score: f64,
    pub matched_tags: Vec<String>,
    pub ai_rationale: String,
    pub delivery_estimate: String,
    pub vendor: String,
}

/// A fully validated, scored, tagged suggestion returned by the pipeline.
///
/// Invariants after the final pass: `price_min <= price_max`,
/// `match_score` in [0.30, 1.00] with two decimals, 3-6 Title Case tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftSuggestion {
    pub title: String,
    pub description: String,
    pub price_min: u64,
    pub price_max: u64,
    pub match_score: f64,
    pub matched_tags: Vec<String>,
    pub ai_rationale: String,
    pub delivery_estimate: String,
    pub vendor: String,
}

impl GiftSuggestion {
    /// Deterministic key for downstream image lookup and caching:
    /// lowercase title and first three tags, joined with underscores,
    /// anything outside `[a-z0-9_]` squashed to `_`.
    pub fn search_key(&self) -> String {
        let tags = self
            .matched_tags
            .iter()
            .take(3)
            .map(|t| t.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        let raw = format!("{}_{}", self.title.to_lowercase(), tags);
        raw.chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}
