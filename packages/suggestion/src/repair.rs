//! JSON repair: pull a candidate array out of free-form model output.
//!
//! The model is instructed to return a bare JSON array, but real responses
//! arrive wrapped in prose, fenced in markdown, truncated mid-array, or
//! broken by stray commas. Recovery is a strict-to-lenient cascade; each
//! step runs only if the previous failed, because every later step is more
//! expensive and more likely to produce spurious matches.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SuggestError, MALFORMED_EXCERPT_LIMIT};

lazy_static! {
    // Fenced code block, optionally tagged `json`
    static ref FENCE_REGEX: Regex = Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap();

    // Non-greedy top-level object matcher; gift objects are flat, so the
    // first closing brace ends the object
    static ref OBJECT_REGEX: Regex = Regex::new(r"\{[\s\S]*?\}").unwrap();

    // Trailing comma before a closing brace or bracket
    static ref TRAILING_COMMA_REGEX: Regex = Regex::new(r",(\s*[}\]])").unwrap();
}

/// Recover an array of candidate objects from raw model text.
///
/// A recovered bare object is wrapped into a one-element array. Fails with
/// `ai_malformed_json` only when every strategy yields nothing.
pub fn extract_candidates(text: &str) -> Result<Vec<Value>> {
    // Cheap pre-strip: when the whole answer sits in a fence, work on the
    // first fence's content for the strict steps.
    let working = first_fence_content(text).unwrap_or_else(|| text.trim().to_string());

    // 1. Direct parse.
    if let Some(parsed) = try_parse(&working) {
        return Ok(to_object_array(parsed));
    }

    // 2. Greedy substring between the first '[' and the last ']'.
    if let Some(parsed) = parse_greedy_array(&working) {
        debug!("recovered candidate array from greedy bracket substring");
        return Ok(to_object_array(parsed));
    }

    // 3. The last fenced block: models sometimes restate the answer inside
    //    a fence after explanatory prose.
    if let Some(fenced) = last_fence_content(text) {
        if let Some(parsed) = try_parse(&fenced).or_else(|| parse_greedy_array(&fenced)) {
            debug!("recovered candidate array from last fenced block");
            return Ok(to_object_array(parsed));
        }
    }

    // 4. Per-object salvage: parse every top-level {...} occurrence
    //    individually, repairing trailing commas. Recovers partial results
    //    from a truncated or comma-broken array.
    let salvaged = salvage_objects(text);
    if !salvaged.is_empty() {
        warn!(
            recovered = salvaged.len(),
            "candidate array unparseable as a whole, salvaged individual objects"
        );
        return Ok(salvaged);
    }

    // 5. Nothing usable.
    let excerpt = excerpt_for_diagnostics(text);
    warn!(excerpt_len = excerpt.len(), "no JSON recovered from model output");
    Err(SuggestError::MalformedJson { excerpt })
}

fn try_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_greedy_array(text: &str) -> Option<Value> {
    let first = text.find('[')?;
    let last = text.rfind(']')?;
    if last <= first {
        return None;
    }
    try_parse(&text[first..=last])
}

fn first_fence_content(text: &str) -> Option<String> {
    FENCE_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn last_fence_content(text: &str) -> Option<String> {
    FENCE_REGEX
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
}

fn salvage_objects(text: &str) -> Vec<Value> {
    let mut objects = Vec::new();
    for found in OBJECT_REGEX.find_iter(text) {
        let candidate = found.as_str();
        if let Some(value) = try_parse(candidate) {
            if value.is_object() {
                objects.push(value);
            }
            continue;
        }
        let repaired = TRAILING_COMMA_REGEX.replace_all(candidate, "$1");
        if let Some(value) = try_parse(&repaired) {
            if value.is_object() {
                objects.push(value);
            }
        }
    }
    objects
}

fn to_object_array(parsed: Value) -> Vec<Value> {
    match parsed {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn excerpt_for_diagnostics(text: &str) -> String {
    if text.len() <= MALFORMED_EXCERPT_LIMIT {
        return text.to_string();
    }
    let mut end = MALFORMED_EXCERPT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
