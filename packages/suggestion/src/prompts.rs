//! Prompts for the gift suggestion pipeline.
//!
//! The system prompt carries the persona, scoring heuristics, and output
//! hygiene rules; the request prompt embeds the concrete recipient
//! attributes and the exact required item count.

use crate::types::GiftRequest;

/// Persona and internal rules sent as the model-role turn.
pub const SYSTEM_PROMPT: &str = r#"You are an expert Indian gift curator and product-recommendation specialist. Adopt these internal rules before reading the user's request; they are for your decision-making only and must NOT be printed.

MINDSET
- Treat every provided hobby and personality trait as mandatory evidence for category choice, scoring, and tag selection. Never ignore a supplied tag.
- Aim for culturally-appropriate, age-appropriate, budget-aware recommendations that feel locally plausible for India.

TAG HANDLING
- Per gift: output 3-6 matched_tags in Title Case, chosen from or tightly derived from the user's supplied tags (e.g. "Gardening / Indoor Plants" -> "Indoor Gardening"). Prefer direct matches.
- Batch coverage: across the full array, maximize coverage of distinct supplied tags so the batch collectively reflects the user's entire input set.

SCORING
- match_score is 0.00-1.00 with exactly two decimals. Weigh hobby alignment, personality alignment, occasion fit, budget fit, delivery feasibility, and category diversity. Sort the array by descending match_score.

BUDGET & PRICING
- Prefer price_min/price_max inside the requested budget. Round prices to the nearest 10 rupees, or to the nearest 50 above Rs 2000. Ensure price_min <= price_max with realistic range widths.
- If an ideal item slightly exceeds budget, clamp within 10% and set match_score <= 0.60.

VENDORS & DELIVERY
- Prefer recognizable Indian vendors (Amazon India, Flipkart, Myntra, Nykaa, Pepperfry, FabIndia, boAt, Chumbak) or a short realistic local vendor name. Do NOT invent URLs.
- Delivery estimates use working-day ranges only: metro city (Mumbai, Delhi, Bengaluru, Chennai, Hyderabad, Pune) -> "1-3 working days in <City>"; other city -> "3-5 working days in <City>"; no city -> "4-7 working days across India".

SAFETY
- No illegal, unsafe, or age-inappropriate items (e.g. alcohol for minors). For elderly recipients prefer accessible items unless hobbies indicate otherwise.

OUTPUT HYGIENE
- Produce ONLY the JSON array the user requests: no prose, no markdown, no code fences, no extra keys, no comments.
- Every object must include exactly: title, description, price_min, price_max, match_score, matched_tags, ai_rationale, delivery_estimate, vendor.
- If you cannot find enough high-quality distinct items, still return the exact requested count by padding with schema-valid fallback items derived from the supplied tags, scored conservatively (0.30-0.60)."#;

/// Template for the user-role turn.
const REQUEST_PROMPT: &str = r#"Generate a compact JSON array of exactly {count} unique, high-quality gift objects for the recipient below and RETURN ONLY THAT ARRAY.

INPUT:
{optional_lines}Relation: {relation}
Occasion: {occasion}
Budget (INR): {budget_min} - {budget_max}
Hobbies: {hobbies}
Personality: {personalities}

STRICT OUTPUT SCHEMA (ALL FIELDS REQUIRED; EXACT TYPES AND NAMES):
[
  {
    "title": "<string, 3-8 words, product-style>",
    "description": "<string, 2-3 sentences referencing at least one hobby/personality or the occasion>",
    "price_min": <integer INR>,
    "price_max": <integer INR, >= price_min>,
    "match_score": <number between 0.00 and 1.00 with exactly two decimals>,
    "matched_tags": ["Tag1", "Tag2", "Tag3"],
    "ai_rationale": "<string, 1-2 sentences, emotionally framed and concise>",
    "delivery_estimate": "<string; working-day range, city-specific if city provided>",
    "vendor": "<string; recognizable Indian vendor or realistic local vendor name>"
  }
]

Rules: exactly {count} objects; 3-6 Title Case matched_tags per gift drawn from the supplied hobbies and personality traits; integer INR prices rounded to the nearest 10 (50 above Rs 2000); batch-level coverage of as many distinct supplied tags as possible; order by match_score descending."#;

/// Render the user-role prompt for a request and a required item count.
pub fn format_request_prompt(request: &GiftRequest, count: usize) -> String {
    let mut optional_lines = String::new();
    if let Some(name) = request.name.as_deref().filter(|n| !n.trim().is_empty()) {
        optional_lines.push_str(&format!("Recipient Name: {}\n", name.trim()));
    }
    if let Some(age) = request.age {
        optional_lines.push_str(&format!("Age: {} years old\n", age));
    }
    if let Some(city) = request.city.as_deref().filter(|c| !c.trim().is_empty()) {
        optional_lines.push_str(&format!("City: {}\n", city.trim()));
    }

    REQUEST_PROMPT
        .replace("{count}", &count.to_string())
        .replace("{optional_lines}", &optional_lines)
        .replace("{relation}", request.relation.trim())
        .replace("{occasion}", request.occasion.trim())
        .replace("{budget_min}", &request.budget_min.to_string())
        .replace("{budget_max}", &request.budget_max.to_string())
        .replace("{hobbies}", &request.hobbies.join(", "))
        .replace("{personalities}", &request.personalities.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GiftRequest {
        GiftRequest {
            name: Some("Asha".to_string()),
            age: Some(45),
            relation: "Mother".to_string(),
            occasion: "Birthday".to_string(),
            budget_min: 500,
            budget_max: 2000,
            hobbies: vec!["Gardening".to_string(), "Reading".to_string()],
            personalities: vec!["Calm".to_string()],
            city: Some("Pune".to_string()),
            offset: 0,
        }
    }

    #[test]
    fn embeds_request_fields_and_count() {
        let prompt = format_request_prompt(&request(), 9);
        assert!(prompt.contains("exactly 9 unique"));
        assert!(prompt.contains("Recipient Name: Asha"));
        assert!(prompt.contains("Age: 45 years old"));
        assert!(prompt.contains("City: Pune"));
        assert!(prompt.contains("Relation: Mother"));
        assert!(prompt.contains("Budget (INR): 500 - 2000"));
        assert!(prompt.contains("Hobbies: Gardening, Reading"));
        assert!(prompt.contains("Personality: Calm"));
    }

    #[test]
    fn omits_absent_optional_lines() {
        let prompt = format_request_prompt(
            &GiftRequest {
                name: None,
                age: None,
                city: None,
                offset: 9,
                ..request()
            },
            6,
        );
        assert!(prompt.contains("exactly 6 unique"));
        assert!(!prompt.contains("Recipient Name:"));
        assert!(!prompt.contains("Age:"));
        assert!(!prompt.contains("City:"));
    }

    #[test]
    fn system_prompt_states_output_hygiene() {
        assert!(SYSTEM_PROMPT.contains("ONLY the JSON array"));
        assert!(SYSTEM_PROMPT.contains("matched_tags"));
        assert!(SYSTEM_PROMPT.contains("4-7 working days across India"));
    }
}
