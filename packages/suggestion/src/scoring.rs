//! Deterministic server-side scoring and tag selection.
//!
//! The model's own `match_score` is advisory: the blended score is dominated
//! by server-computed tag overlap and budget fit, so reordering cannot be
//! steered by model output alone.

use crate::normalize::round2;
use crate::types::Candidate;

/// Minimum tags attached to every suggestion.
pub const MIN_TAGS: usize = 3;

/// Maximum tags attached to every suggestion.
pub const MAX_TAGS: usize = 6;

/// Generic tags used to reach [`MIN_TAGS`] when the request and candidate
/// together offer too few.
pub(crate) const FALLBACK_TAGS: &[&str] = &["Thoughtful", "Personalised", "Occasion Ready"];

const OVERLAP_WEIGHT: f64 = 0.8;
const BUDGET_WEIGHT: f64 = 0.2;
const SERVER_WEIGHT: f64 = 0.65;
const MODEL_WEIGHT: f64 = 0.35;
const STRONG_MATCH_BONUS: f64 = 0.08;
const BUDGET_MISS_PENALTY: f64 = 0.12;

/// Fraction of user tags found in the candidate's title, description, or
/// model tags. A tag hits on a whole-phrase match, or token-wise when every
/// meaningful token appears ("Indoor Plants" matches text carrying "indoor"
/// and "plants" separately). 0 when there are no user tags.
pub fn overlap_score(candidate: &Candidate, user_tags: &[String]) -> f64 {
    if user_tags.is_empty() {
        return 0.0;
    }
    let haystack = candidate_haystack(candidate);
    let hits = user_tags
        .iter()
        .filter(|tag| tag_matches(&tag.to_lowercase(), &haystack))
        .count();
    hits as f64 / user_tags.len() as f64
}

fn tag_matches(tag_lower: &str, haystack: &str) -> bool {
    if haystack.contains(tag_lower) {
        return true;
    }
    let mut tokens = tag_tokens(tag_lower).peekable();
    tokens.peek().is_some() && tokens.all(|token| haystack.contains(token))
}

/// Budget fit of the candidate's price range against the requested budget.
///
/// 1.0 when fully contained, 0.25 when disjoint, a value strictly between
/// for a partial overlap (proportional to how much of the candidate's range
/// falls inside the budget), and a neutral 0.5 when the candidate carries no
/// usable price at all.
pub fn budget_score(candidate: &Candidate, budget_min: i64, budget_max: i64) -> f64 {
    let (Some(price_min), Some(price_max)) = (candidate.price_min, candidate.price_max) else {
        return 0.5;
    };
    let (price_min, price_max) = (price_min.min(price_max) as i64, price_min.max(price_max) as i64);

    if price_min >= budget_min && price_max <= budget_max {
        return 1.0;
    }
    if price_max < budget_min || price_min > budget_max {
        return 0.25;
    }
    let overlap = (price_max.min(budget_max) - price_min.max(budget_min)).max(0);
    let range = price_max - price_min;
    let proportion = if range == 0 {
        1.0
    } else {
        (overlap as f64 / range as f64).clamp(0.0, 1.0)
    };
    0.3 + 0.25 * proportion
}

/// Blend server and model scores and apply the deterministic adjustments,
/// in order: bonus for strong overlap with solid budget fit, penalty for a
/// clear budget miss. Always lands in [0, 1] at two decimals.
pub fn final_score(overlap: f64, budget: f64, model_score: f64) -> f64 {
    let server = OVERLAP_WEIGHT * overlap + BUDGET_WEIGHT * budget;
    let mut blended = (SERVER_WEIGHT * server + MODEL_WEIGHT * model_score).clamp(0.0, 1.0);
    if overlap >= 0.75 && budget >= 0.9 {
        blended = (blended + STRONG_MATCH_BONUS).min(1.0);
    }
    if budget < 0.3 {
        blended = (blended - BUDGET_MISS_PENALTY).max(0.0);
    }
    round2(blended)
}

/// Full score for a candidate against the request's tags and budget.
pub fn score_candidate(
    candidate: &Candidate,
    user_tags: &[String],
    budget_min: i64,
    budget_max: i64,
) -> f64 {
    final_score(
        overlap_score(candidate, user_tags),
        budget_score(candidate, budget_min, budget_max),
        candidate.match_score,
    )
}

/// Choose 3–6 Title Case tags for a candidate.
///
/// Model tags that map onto a user tag (exact or substring either way,
/// case-insensitive) come first; remaining slots fill with the most relevant
/// unused user tags; title tokens are the last resort.
pub fn select_tags(candidate: &Candidate, user_tags: &[String]) -> Vec<String> {
    let haystack = candidate_haystack(candidate);
    let mut selected: Vec<String> = Vec::new();

    for model_tag in &candidate.matched_tags {
        if selected.len() == MAX_TAGS {
            break;
        }
        let model_lower = model_tag.to_lowercase();
        if model_lower.is_empty() {
            continue;
        }
        if let Some(user_tag) = user_tags.iter().find(|tag| {
            let tag_lower = tag.to_lowercase();
            tag_lower == model_lower
                || tag_lower.contains(&model_lower)
                || model_lower.contains(&tag_lower)
        }) {
            push_unique(&mut selected, title_case(user_tag));
        }
    }

    // Stable sort keeps the user's tag order among equal relevance
    let mut remaining: Vec<(usize, &String)> = user_tags
        .iter()
        .filter(|tag| !contains_ci(&selected, tag))
        .map(|tag| (relevance(tag, &haystack), tag))
        .collect();
    remaining.sort_by(|a, b| b.0.cmp(&a.0));
    for (score, tag) in remaining {
        if selected.len() >= MAX_TAGS || (score == 0 && selected.len() >= MIN_TAGS) {
            break;
        }
        push_unique(&mut selected, title_case(tag));
    }

    if selected.len() < MIN_TAGS {
        for token in candidate.title.split_whitespace() {
            if selected.len() >= MIN_TAGS {
                break;
            }
            let cleaned: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
            if cleaned.len() > 2 {
                push_unique(&mut selected, title_case(&cleaned));
            }
        }
    }

    // A sparse request and a bare candidate can still leave too few;
    // generic fallbacks keep the 3-tag minimum unconditional.
    for fallback in FALLBACK_TAGS {
        if selected.len() >= MIN_TAGS {
            break;
        }
        push_unique(&mut selected, fallback.to_string());
    }

    selected
}

/// Title Case with word boundaries at whitespace, hyphens, and underscores.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

fn candidate_haystack(candidate: &Candidate) -> String {
    format!(
        "{} {} {}",
        candidate.title,
        candidate.description,
        candidate.matched_tags.join(" ")
    )
    .to_lowercase()
}

/// Token hits in the haystack, with a bonus when the whole tag appears.
fn relevance(tag: &str, haystack: &str) -> usize {
    let tag_lower = tag.to_lowercase();
    let token_hits = tag_tokens(&tag_lower)
        .filter(|token| haystack.contains(token))
        .count();
    let whole_bonus = if haystack.contains(&tag_lower) { 2 } else { 0 };
    token_hits + whole_bonus
}

fn tag_tokens(tag_lower: &str) -> impl Iterator<Item = &str> {
    tag_lower
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '/')
        .filter(|token| token.len() > 2)
}

fn contains_ci(tags: &[String], tag: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !contains_ci(tags, &tag) {
        tags.push(tag);
    }
}
