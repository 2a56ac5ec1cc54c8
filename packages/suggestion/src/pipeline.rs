//! The suggestion pipeline: one request in, an exact-size scored batch out.
//!
//! Stateless per invocation; all tuning lives in [`PipelineConfig`] and the
//! model lives behind [`CompletionBackend`], so the pipeline itself is a
//! deterministic function of the request and the model's text.

use gemini_client::GenerationConfig;
use tracing::{debug, info};

use crate::backend::CompletionBackend;
use crate::batch::{delivery_estimate, finalize, round_price, size_batch};
use crate::coverage::{apply_coverage, compute_coverage};
use crate::error::Result;
use crate::normalize::normalize_candidate;
use crate::prompts::{format_request_prompt, SYSTEM_PROMPT};
use crate::repair::extract_candidates;
use crate::scoring::{score_candidate, select_tags};
use crate::types::{Candidate, GiftRequest, GiftSuggestion, FIRST_BATCH_COUNT, MORE_BATCH_COUNT};

/// Tuning knobs for a pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub first_batch_count: usize,
    pub more_batch_count: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            first_batch_count: FIRST_BATCH_COUNT,
            more_batch_count: MORE_BATCH_COUNT,
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

impl PipelineConfig {
    fn required_count(&self, request: &GiftRequest) -> usize {
        if request.is_first_batch() {
            self.first_batch_count
        } else {
            self.more_batch_count
        }
    }
}

/// The suggestion generator.
pub struct SuggestionPipeline<B: CompletionBackend> {
    backend: B,
    config: PipelineConfig,
}

impl<B: CompletionBackend> SuggestionPipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Produce exactly the required number of scored, tagged suggestions.
    ///
    /// All-or-nothing: a backend failure or unrecoverable model output
    /// propagates as an error, never as a silently short batch.
    pub async fn generate(&self, request: &GiftRequest) -> Result<Vec<GiftSuggestion>> {
        request.validate()?;
        let user_tags = request.user_tags();
        let required = self.config.required_count(request);

        info!(
            required,
            offset = request.offset,
            tags = user_tags.len(),
            "generating gift suggestions"
        );

        let user_prompt = format_request_prompt(request, required);
        let generation = GenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };
        let raw = self
            .backend
            .complete(SYSTEM_PROMPT, &user_prompt, &generation)
            .await?;

        let objects = extract_candidates(&raw)?;
        debug!(candidates = objects.len(), "recovered candidate objects");

        let scored: Vec<GiftSuggestion> = objects
            .iter()
            .map(normalize_candidate)
            .map(|candidate| build_suggestion(&candidate, &user_tags, request))
            .collect();

        let report = compute_coverage(&scored, &user_tags);
        let covered = apply_coverage(scored, &report);

        let sized = size_batch(covered, required, request, &user_tags);

        let report = compute_coverage(&sized, &user_tags);
        let repaired = apply_coverage(sized, &report);

        let finalized = finalize(repaired);
        info!(count = finalized.len(), "suggestion batch ready");
        Ok(finalized)
    }
}

/// Score and tag one normalized candidate against the request.
fn build_suggestion(
    candidate: &Candidate,
    user_tags: &[String],
    request: &GiftRequest,
) -> GiftSuggestion {
    let match_score = score_candidate(candidate, user_tags, request.budget_min, request.budget_max);
    let matched_tags = select_tags(candidate, user_tags);
    let (price_min, price_max) = resolve_prices(candidate, request);
    let delivery_estimate = if candidate.delivery_estimate.is_empty() {
        delivery_estimate(request.city.as_deref())
    } else {
        candidate.delivery_estimate.clone()
    };

    GiftSuggestion {
        title: candidate.title.clone(),
        description: candidate.description.clone(),
        price_min,
        price_max,
        match_score,
        matched_tags,
        ai_rationale: candidate.ai_rationale.clone(),
        delivery_estimate,
        vendor: candidate.vendor.clone(),
    }
}

/// A candidate missing one bound inherits the other; missing both, the
/// range derives from the requested budget.
fn resolve_prices(candidate: &Candidate, request: &GiftRequest) -> (u64, u64) {
    match (candidate.price_min, candidate.price_max) {
        (Some(min), Some(max)) => (min.min(max), min.max(max)),
        (Some(only), None) | (None, Some(only)) => (only, only),
        (None, None) => {
            let min = round_price(request.budget_min);
            (min, round_price(request.budget_max).max(min))
        }
    }
}
