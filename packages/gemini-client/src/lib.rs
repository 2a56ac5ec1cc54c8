//! Pure REST client for the Google Generative Language API (Gemini).
//!
//! Owns the transport concerns the rest of the system should never see:
//! a single explicit retry policy with exponential backoff and jitter,
//! one-shot output-length escalation when the model truncates, and
//! extraction of usable text from the several response envelope shapes
//! the API has historically returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerationConfig};
//!
//! let client = GeminiClient::from_env()?;
//! let text = client
//!     .complete("You are a helpful assistant.", "Say hi", &GenerationConfig::default())
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::GeminiClient;
pub use error::{GeminiError, Result};
pub use retry::RetryPolicy;
pub use types::{extract_text, finish_reason, GenerationConfig};
