//! The gift request and the user-tag ground truth derived from it.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuggestError};

/// Suggestions returned for the first page of results.
pub const FIRST_BATCH_COUNT: usize = 9;

/// Suggestions returned for each subsequent "show more" page.
pub const MORE_BATCH_COUNT: usize = 6;

/// A structured gift request.
///
/// Required fields must be validated by the caller before the pipeline
/// runs; [`GiftRequest::validate`] produces the 400-style field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    pub relation: String,
    pub occasion: String,
    pub budget_min: i64,
    pub budget_max: i64,
    pub hobbies: Vec<String>,
    pub personalities: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub offset: usize,
}

impl GiftRequest {
    /// Check required fields, collecting every problem rather than
    /// stopping at the first.
    pub fn validate(&self) -> Result<()> {
        let mut fields = Vec::new();
        if self.relation.trim().is_empty() {
            fields.push("relation".to_string());
        }
        if self.occasion.trim().is_empty() {
            fields.push("occasion".to_string());
        }
        if self.budget_min < 0 {
            fields.push("budget_min".to_string());
        }
        if self.budget_max < 0 || self.budget_max < self.budget_min {
            fields.push("budget_max".to_string());
        }
        if self.hobbies.iter().all(|h| h.trim().is_empty()) {
            fields.push("hobbies".to_string());
        }
        if self.personalities.iter().all(|p| p.trim().is_empty()) {
            fields.push("personalities".to_string());
        }
        if self.age == Some(0) {
            fields.push("age".to_string());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(SuggestError::Validation { fields })
        }
    }

    /// A zero offset means the richer first page of results.
    pub fn is_first_batch(&self) -> bool {
        self.offset == 0
    }

    /// Exact number of suggestions this request must produce.
    pub fn required_count(&self) -> usize {
        if self.is_first_batch() {
            FIRST_BATCH_COUNT
        } else {
            MORE_BATCH_COUNT
        }
    }

    /// The deduplicated union of hobbies and personality traits, trimmed,
    /// order-preserving on first occurrence. This list is the ground truth
    /// for overlap scoring and batch coverage.
    pub fn user_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for raw in self.hobbies.iter().chain(self.personalities.iter()) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !tags.iter().any(|t| t == trimmed) {
                tags.push(trimmed.to_string());
            }
        }
        tags
    }
}
