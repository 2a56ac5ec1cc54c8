//! Candidate normalization: coerce raw model objects into typed records.
//!
//! Every coercion is total. A candidate object may be missing fields,
//! carry the wrong types, or express its score as "85%" — normalization
//! always produces a best-effort `Candidate` so downstream components can
//! rely on types without further defensive checks.

use serde_json::Value;

use crate::types::Candidate;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Coerce a raw object into a well-typed candidate. Never fails; absent or
/// garbage fields become empty strings, `None` prices, or a zero score.
pub fn normalize_candidate(raw: &Value) -> Candidate {
    Candidate {
        title: coerce_string(raw.get("title")),
        description: coerce_string(raw.get("description")),
        price_min: coerce_price(raw.get("price_min")),
        price_max: coerce_price(raw.get("price_max")),
        match_score: coerce_score(raw.get("match_score")),
        matched_tags: coerce_tags(raw.get("matched_tags")),
        ai_rationale: coerce_string(raw.get("ai_rationale")),
        delivery_estimate: coerce_string(raw.get("delivery_estimate")),
        vendor: coerce_string(raw.get("vendor")),
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Prices: finite numbers (or numeric strings) rounded and floored at 0;
/// anything else is treated as absent.
fn coerce_price(value: Option<&Value>) -> Option<u64> {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().max(0.0) as u64)
}

/// Scores: numbers or numeric-looking strings (trailing `%`, currency
/// symbols, thousands separators tolerated). Values above 1 are read as
/// percentages; above 100, a second scale-down is applied before clamping
/// into [0, 1] and rounding to two decimals. Unparseable input scores 0.
fn coerce_score(value: Option<&Value>) -> f64 {
    let mut score = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('%')
                .chars()
                .filter(|c| !matches!(c, ',' | '₹' | '$' | ' '))
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    if !score.is_finite() {
        return 0.0;
    }
    if score > 1.0 {
        score /= 100.0;
        if score > 1.0 {
            score /= 100.0;
        }
    }
    round2(score.clamp(0.0, 1.0))
}

fn coerce_tags(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_str())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
