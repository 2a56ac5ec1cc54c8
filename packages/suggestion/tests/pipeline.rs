//! End-to-end pipeline tests against a scripted backend.

use gemini_client::GeminiError;
use suggestion::testing::MockBackend;
use suggestion::types::{FIRST_BATCH_COUNT, MORE_BATCH_COUNT};
use suggestion::{GiftRequest, GiftSuggestion, SuggestionPipeline};

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

fn model_response() -> String {
    serde_json::json!([
        {
            "title": "Indoor Herb Garden Kit",
            "description": "A compact gardening kit for the balcony.",
            "price_min": 800,
            "price_max": 1200,
            "match_score": 0.92,
            "matched_tags": ["Gardening"],
            "ai_rationale": "Feeds her love of growing things.",
            "delivery_estimate": "1-3 working days in Pune",
            "vendor": "Amazon India"
        },
        {
            "title": "Premium Reading Lamp",
            "description": "Warm light for long reading evenings.",
            "price_min": 1100,
            "price_max": 1600,
            "match_score": "88%",
            "matched_tags": ["Reading"],
            "ai_rationale": "Comfortable evenings with her books.",
            "delivery_estimate": "1-3 working days in Pune",
            "vendor": "Flipkart"
        },
        {
            "title": "Meditation Cushion Set",
            "description": "A calm corner for quiet mornings.",
            "price_min": 900,
            "price_max": 1400,
            "match_score": 0.81,
            "matched_tags": ["Calm"],
            "ai_rationale": "Suits her calm temperament.",
            "delivery_estimate": "1-3 working days in Pune",
            "vendor": "Pepperfry"
        },
        {
            "title": "Overpriced Espresso Machine",
            "description": "A premium machine.",
            "price_min": 15000,
            "price_max": 22000,
            "match_score": 0.95,
            "matched_tags": [],
            "ai_rationale": "Fancy but off budget.",
            "delivery_estimate": "",
            "vendor": "Amazon India"
        }
    ])
    .to_string()
}

fn assert_batch_invariants(batch: &[GiftSuggestion], expected_len: usize) {
    assert_eq!(batch.len(), expected_len);
    for pair in batch.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
    for suggestion in batch {
        assert!((0.30..=1.00).contains(&suggestion.match_score));
        let cents = suggestion.match_score * 100.0;
        assert!((cents.round() - cents).abs() < 1e-9, "score not 2-decimal");
        assert!(suggestion.price_min <= suggestion.price_max);
        assert!(
            (3..=6).contains(&suggestion.matched_tags.len()),
            "bad tag count: {:?}",
            suggestion.matched_tags
        );
        assert!(!suggestion.title.is_empty() || suggestion.match_score <= 0.60);
    }
}

// Coverage is a promise about matched_tags specifically; a mention in a
// title or description does not count.
fn tag_is_covered(batch: &[GiftSuggestion], tag: &str) -> bool {
    let tag = tag.to_lowercase();
    batch
        .iter()
        .any(|s| s.matched_tags.iter().any(|t| t.to_lowercase().contains(&tag)))
}

#[tokio::test]
async fn first_batch_is_exact_sorted_and_covered() {
    let backend = MockBackend::new().with_response(model_response());
    let pipeline = SuggestionPipeline::new(backend);

    let batch = pipeline.generate(&request()).await.unwrap();
    assert_batch_invariants(&batch, FIRST_BATCH_COUNT);

    for tag in ["Gardening", "Reading", "Calm"] {
        assert!(tag_is_covered(&batch, tag), "tag {tag} not covered");
    }

    // The under-delivered batch was padded; padding keeps the city bucket
    let padded = batch
        .iter()
        .filter(|s| s.delivery_estimate == "1-3 working days in Pune")
        .count();
    assert_eq!(padded, FIRST_BATCH_COUNT);

    // The off-budget item exists but cannot outrank the on-budget matches
    let espresso = batch
        .iter()
        .find(|s| s.title.contains("Espresso"))
        .expect("off-budget item kept");
    assert!(espresso.match_score < batch[0].match_score);
}

#[tokio::test]
async fn follow_up_batch_returns_six() {
    let backend = MockBackend::new().with_response(model_response());
    let pipeline = SuggestionPipeline::new(backend.clone());

    let more = GiftRequest {
        offset: 9,
        ..request()
    };
    let batch = pipeline.generate(&more).await.unwrap();
    assert_batch_invariants(&batch, MORE_BATCH_COUNT);
    assert!(backend.calls()[0].user.contains("exactly 6 unique"));
}

#[tokio::test]
async fn salvages_a_broken_array() {
    let text = r#"Here are my picks:
[
  {"title": "Clay Planter Set", "description": "For her gardening corner.", "price_min": 600, "price_max": 900, "match_score": 0.8, "matched_tags": ["Gardening"], "ai_rationale": "r", "delivery_estimate": "", "vendor": "Pepperfry"},
  {"title": "Book Subscription", "description": "Monthly reading", "price_min": 1000, "#;
    let backend = MockBackend::new().with_response(text);
    let pipeline = SuggestionPipeline::new(backend);

    let batch = pipeline.generate(&request()).await.unwrap();
    assert_batch_invariants(&batch, FIRST_BATCH_COUNT);
    assert!(batch.iter().any(|s| s.title == "Clay Planter Set"));
}

#[tokio::test]
async fn sparse_requests_still_meet_the_tag_minimum() {
    // One deduped user tag and a candidate with no title at all
    let text = serde_json::json!([{
        "description": "A set of utensils.",
        "price_min": 600,
        "price_max": 900,
        "match_score": 0.7
    }])
    .to_string();
    let backend = MockBackend::new().with_response(text);
    let pipeline = SuggestionPipeline::new(backend);

    let sparse = GiftRequest {
        hobbies: vec!["Cooking".to_string()],
        personalities: vec!["Cooking".to_string()],
        city: None,
        ..request()
    };
    let batch = pipeline.generate(&sparse).await.unwrap();
    assert_batch_invariants(&batch, FIRST_BATCH_COUNT);
    assert!(tag_is_covered(&batch, "Cooking"));
}

#[tokio::test]
async fn unusable_output_maps_to_malformed_json() {
    let backend = MockBackend::new().with_response("Sorry, I cannot help with that.");
    let pipeline = SuggestionPipeline::new(backend);

    let err = pipeline.generate(&request()).await.unwrap_err();
    assert_eq!(err.code(), "ai_malformed_json");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn backend_outage_propagates_with_its_code() {
    let backend = MockBackend::new().with_error(GeminiError::ApiUnavailable {
        status: 429,
        body: "rate limited".to_string(),
    });
    let pipeline = SuggestionPipeline::new(backend);

    let err = pipeline.generate(&request()).await.unwrap_err();
    assert_eq!(err.code(), "ai_api_unavailable");
    assert!(err.is_transient());
}
