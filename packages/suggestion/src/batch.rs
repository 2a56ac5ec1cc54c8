//! Batch sizing: the pipeline returns exactly the requested count.
//!
//! Overlong batches truncate after a stable descending sort; short batches
//! pad with deterministic, schema-valid fallbacks synthesized from the
//! user's own tags so the contract holds even when the model under-delivers.

use tracing::warn;

use crate::normalize::round2;
use crate::scoring::{title_case, FALLBACK_TAGS, MIN_TAGS};
use crate::types::{GiftRequest, GiftSuggestion};

/// Conservative score carried by every synthesized padding suggestion.
pub const PADDING_SCORE: f64 = 0.45;

/// Lower bound applied to every score in the final pass.
pub const MIN_FINAL_SCORE: f64 = 0.30;

/// Cities with fast courier coverage.
pub const METRO_CITIES: &[&str] = &[
    "Mumbai",
    "Delhi",
    "Bengaluru",
    "Chennai",
    "Hyderabad",
    "Pune",
];

/// Recognizable Indian vendors, rotated through padding suggestions.
const VENDORS: &[&str] = &[
    "Amazon India",
    "Flipkart",
    "Myntra",
    "Nykaa",
    "Pepperfry",
    "FabIndia",
    "boAt",
    "Chumbak",
];

const PAD_TITLE_SUFFIXES: &[&str] = &["Gift Hamper", "Starter Kit", "Essentials Set"];

/// Stable sort by descending match score.
pub fn sort_descending(suggestions: &mut [GiftSuggestion]) {
    suggestions.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Force the batch to exactly `required` entries: sort, truncate, then pad
/// with synthesized fallbacks while short.
pub fn size_batch(
    mut suggestions: Vec<GiftSuggestion>,
    required: usize,
    request: &GiftRequest,
    user_tags: &[String],
) -> Vec<GiftSuggestion> {
    sort_descending(&mut suggestions);
    suggestions.truncate(required);

    if suggestions.len() < required {
        warn!(
            produced = suggestions.len(),
            required, "model under-delivered, padding with fallback suggestions"
        );
    }
    let mut pad_index = 0;
    while suggestions.len() < required {
        suggestions.push(padding_suggestion(pad_index, request, user_tags));
        pad_index += 1;
    }
    suggestions
}

/// Final invariant pass: scores clamped into [0.30, 1.00] at two decimals,
/// price ranges ordered, batch re-sorted descending.
pub fn finalize(mut suggestions: Vec<GiftSuggestion>) -> Vec<GiftSuggestion> {
    for suggestion in &mut suggestions {
        suggestion.match_score = round2(suggestion.match_score.clamp(MIN_FINAL_SCORE, 1.0));
        if suggestion.price_min > suggestion.price_max {
            std::mem::swap(&mut suggestion.price_min, &mut suggestion.price_max);
        }
    }
    sort_descending(&mut suggestions);
    suggestions
}

/// Round to the nearest 10 rupees, or the nearest 50 above ₹2000.
/// Negative amounts floor at 0.
pub fn round_price(amount: i64) -> u64 {
    let amount = amount.max(0);
    let step = if amount > 2000 { 50 } else { 10 };
    (((amount + step / 2) / step) * step) as u64
}

/// Delivery phrasing by city bucket.
pub fn delivery_estimate(city: Option<&str>) -> String {
    match city.map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) if METRO_CITIES.iter().any(|m| m.eq_ignore_ascii_case(city)) => {
            format!("1-3 working days in {}", title_case(city))
        }
        Some(city) => format!("3-5 working days in {}", title_case(city)),
        None => "4-7 working days across India".to_string(),
    }
}

/// A deterministic schema-valid fallback rooted in the user's own tags.
fn padding_suggestion(
    index: usize,
    request: &GiftRequest,
    user_tags: &[String],
) -> GiftSuggestion {
    let lead_tag = user_tags
        .get(index % user_tags.len().max(1))
        .map(|t| title_case(t))
        .unwrap_or_else(|| "Thoughtful".to_string());

    let mut tags = vec![lead_tag.clone()];
    for step in 1..user_tags.len() {
        if tags.len() == MIN_TAGS {
            break;
        }
        let tag = title_case(&user_tags[(index + step) % user_tags.len()]);
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
    for fallback in FALLBACK_TAGS {
        if tags.len() == MIN_TAGS {
            break;
        }
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(fallback)) {
            tags.push(fallback.to_string());
        }
    }

    let price_min = round_price(request.budget_min);
    let price_max = round_price(request.budget_max).max(price_min);
    let suffix = PAD_TITLE_SUFFIXES[index % PAD_TITLE_SUFFIXES.len()];

    GiftSuggestion {
        title: format!("{lead_tag} {suffix}"),
        description: format!(
            "A dependable {} pick for someone who enjoys {}. Selected to sit \
             comfortably within the Rs {}-{} budget.",
            request.occasion.trim(),
            lead_tag,
            price_min,
            price_max
        ),
        price_min,
        price_max,
        match_score: PADDING_SCORE,
        matched_tags: tags,
        ai_rationale: format!(
            "A safe, budget-fit choice rooted in their interest in {lead_tag}."
        ),
        delivery_estimate: delivery_estimate(request.city.as_deref()),
        vendor: VENDORS[index % VENDORS.len()].to_string(),
    }
}
