//! Data types for the suggestion pipeline.

pub mod gift;
pub mod request;

pub use gift::{Candidate, GiftSuggestion};
pub use request::{GiftRequest, FIRST_BATCH_COUNT, MORE_BATCH_COUNT};
