//! Request types and response-envelope handling.
//!
//! The Generative Language API has returned several envelope shapes over
//! time. Rather than scattering conditionals through the client, text
//! extraction is an ordered list of pure strategies tried in sequence;
//! the first one that yields text wins.

use serde::Serialize;
use serde_json::Value;

/// Generation parameters forwarded to the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

impl GenerationConfig {
    /// The config used for the single follow-up attempt after a truncated
    /// completion: same temperature, doubled output allowance.
    pub fn escalated(&self) -> Self {
        Self {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens.saturating_mul(2),
        }
    }
}

/// Chat message for the generateContent request body.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Extract usable text from a response envelope, trying each known shape
/// in order and stopping at the first hit.
pub fn extract_text(response: &Value) -> Option<String> {
    const STRATEGIES: &[fn(&Value) -> Option<String>] = &[
        extract_from_candidates,
        extract_from_output,
        extract_from_top_level,
    ];
    STRATEGIES.iter().find_map(|strategy| strategy(response))
}

/// Modern shape: `candidates[0].content` is either an array of content items
/// carrying `parts[0].text`, or a single object with `parts[0].text`.
fn extract_from_candidates(response: &Value) -> Option<String> {
    let content = &response.get("candidates")?.get(0)?.get("content")?;
    if let Some(items) = content.as_array() {
        for item in items {
            if let Some(text) = part_text(item) {
                return Some(text);
            }
            if let Some(text) = item.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
        }
        return None;
    }
    part_text(content).or_else(|| {
        content
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

/// Alternative shape: `output[*].content[*]` with `text` or `parts[0].text`.
fn extract_from_output(response: &Value) -> Option<String> {
    for item in response.get("output")?.as_array()? {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for entry in content {
            if let Some(text) = entry.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
            if let Some(text) = part_text(entry) {
                return Some(text);
            }
        }
    }
    None
}

/// Last resort: assorted flat text fields seen in older responses.
fn extract_from_top_level(response: &Value) -> Option<String> {
    let first_candidate = response.get("candidates").and_then(|c| c.get(0));
    first_candidate
        .and_then(|c| c.get("output_text"))
        .or_else(|| first_candidate.and_then(|c| c.get("text")))
        .or_else(|| response.get("text"))
        .or_else(|| response.get("generated_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn part_text(value: &Value) -> Option<String> {
    value
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// Finish reason of the first candidate, if present.
pub fn finish_reason(response: &Value) -> Option<String> {
    let candidate = response.get("candidates")?.get(0)?;
    candidate
        .get("finishReason")
        .or_else(|| candidate.get("finish_reason"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_modern_candidates_shape() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "hello" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("hello"));
        assert_eq!(finish_reason(&response).as_deref(), Some("STOP"));
    }

    #[test]
    fn extracts_candidates_content_array_shape() {
        let response = json!({
            "candidates": [{
                "content": [
                    { "irrelevant": true },
                    { "parts": [{ "text": "from array" }] }
                ]
            }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("from array"));
    }

    #[test]
    fn extracts_output_shape() {
        let response = json!({
            "output": [{
                "content": [{ "text": "output text" }]
            }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("output text"));
    }

    #[test]
    fn extracts_top_level_fallbacks() {
        assert_eq!(
            extract_text(&json!({ "text": "flat" })).as_deref(),
            Some("flat")
        );
        assert_eq!(
            extract_text(&json!({ "generated_text": "legacy" })).as_deref(),
            Some("legacy")
        );
        assert_eq!(
            extract_text(&json!({ "candidates": [{ "output_text": "old" }] })).as_deref(),
            Some("old")
        );
    }

    #[test]
    fn missing_text_yields_none() {
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
        assert_eq!(extract_text(&json!({})), None);
    }

    #[test]
    fn snake_case_finish_reason() {
        let response = json!({ "candidates": [{ "finish_reason": "MAX_TOKENS" }] });
        assert_eq!(finish_reason(&response).as_deref(), Some("MAX_TOKENS"));
    }

    #[test]
    fn escalated_config_doubles_output_allowance() {
        let config = GenerationConfig {
            temperature: 0.7,
            max_output_tokens: 2048,
        };
        let escalated = config.escalated();
        assert_eq!(escalated.max_output_tokens, 4096);
        assert_eq!(escalated.temperature, 0.7);
    }
}
