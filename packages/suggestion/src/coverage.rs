//! Batch-level tag coverage.
//!
//! A batch should collectively reflect every tag the user supplied, not just
//! the popular ones. Coverage runs as two pure steps: `compute_coverage`
//! inspects an immutable snapshot and plans assignments, `apply_coverage`
//! replays the plan onto an owned batch. Keeping the analysis side-effect
//! free makes the round-robin placement independently testable.

use tracing::debug;

use crate::scoring::title_case;
use crate::types::GiftSuggestion;

/// Extra tags stop once a suggestion reaches this many.
pub const COVERAGE_TAG_CAPACITY: usize = 5;

/// The coverage state of a batch and the planned repairs.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// User tags already represented somewhere in the batch.
    pub covered: Vec<String>,
    /// Planned additions: (suggestion index, Title Case tag).
    pub assignments: Vec<(usize, String)>,
    /// User tags that could not be placed because every slot was full.
    pub unassigned: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Plan coverage for a snapshot of the batch.
///
/// Uncovered tags are distributed greedily round-robin, rotating the start
/// index so consecutive tags land on different suggestions; a suggestion at
/// [`COVERAGE_TAG_CAPACITY`] no longer accepts extras.
pub fn compute_coverage(suggestions: &[GiftSuggestion], user_tags: &[String]) -> CoverageReport {
    let mut covered = Vec::new();
    let mut uncovered = Vec::new();
    for tag in user_tags {
        if suggestions.iter().any(|s| mentions_tag(s, tag)) {
            covered.push(tag.clone());
        } else {
            uncovered.push(tag.clone());
        }
    }

    let mut tag_counts: Vec<usize> = suggestions.iter().map(|s| s.matched_tags.len()).collect();
    let mut assignments = Vec::new();
    let mut unassigned = Vec::new();
    let mut cursor = 0usize;

    for tag in uncovered {
        let placed = place_round_robin(&mut tag_counts, &mut cursor);
        match placed {
            Some(index) => assignments.push((index, title_case(&tag))),
            None => unassigned.push(tag),
        }
    }

    if !assignments.is_empty() {
        debug!(
            planned = assignments.len(),
            leftover = unassigned.len(),
            "planned coverage assignments for uncovered tags"
        );
    }

    CoverageReport {
        covered,
        assignments,
        unassigned,
    }
}

/// Apply a plan produced by [`compute_coverage`] to an owned batch.
/// Out-of-range or duplicate assignments are ignored.
pub fn apply_coverage(
    mut suggestions: Vec<GiftSuggestion>,
    report: &CoverageReport,
) -> Vec<GiftSuggestion> {
    for (index, tag) in &report.assignments {
        let Some(suggestion) = suggestions.get_mut(*index) else {
            continue;
        };
        if !suggestion
            .matched_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
        {
            suggestion.matched_tags.push(tag.clone());
        }
    }
    suggestions
}

fn place_round_robin(tag_counts: &mut [usize], cursor: &mut usize) -> Option<usize> {
    if tag_counts.is_empty() {
        return None;
    }
    let len = tag_counts.len();
    for step in 0..len {
        let index = (*cursor + step) % len;
        if tag_counts[index] < COVERAGE_TAG_CAPACITY {
            tag_counts[index] += 1;
            *cursor = (index + 1) % len;
            return Some(index);
        }
    }
    None
}

/// Case-insensitive containment in the suggestion's tag list. Titles and
/// descriptions do not count: coverage is a promise about `matched_tags`,
/// the field downstream consumers filter on.
fn mentions_tag(suggestion: &GiftSuggestion, tag: &str) -> bool {
    let tag_lower = tag.to_lowercase();
    suggestion
        .matched_tags
        .iter()
        .any(|t| t.to_lowercase().contains(&tag_lower))
}
