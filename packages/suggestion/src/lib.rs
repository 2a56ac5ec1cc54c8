//! Gift suggestion pipeline.
//!
//! Turns a structured gift request into an exact-size batch of scored,
//! tagged suggestions: prompt building, a strict-to-lenient JSON repair
//! cascade over raw model output, total candidate normalization,
//! deterministic server-side scoring, batch-level tag coverage, and
//! deterministic padding when the model under-delivers.
//!
//! The model sits behind [`CompletionBackend`]; production wires in
//! `gemini_client::GeminiClient`, tests use [`testing::MockBackend`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//! use suggestion::{GiftRequest, SuggestionPipeline};
//!
//! let pipeline = SuggestionPipeline::new(GeminiClient::from_env()?);
//! let suggestions = pipeline.generate(&request).await?;
//! ```

pub mod backend;
pub mod batch;
pub mod coverage;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod scoring;
pub mod testing;
pub mod types;

pub use backend::CompletionBackend;
pub use error::{Result, SuggestError};
pub use pipeline::{PipelineConfig, SuggestionPipeline};
pub use types::{Candidate, GiftRequest, GiftSuggestion, FIRST_BATCH_COUNT, MORE_BATCH_COUNT};
