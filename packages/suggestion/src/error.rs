//! Typed errors for the suggestion pipeline.

use thiserror::Error;

use gemini_client::GeminiError;

/// Result type alias for suggestion operations.
pub type Result<T> = std::result::Result<T, SuggestError>;

/// Maximum excerpt length kept when the repair cascade fails outright.
pub(crate) const MALFORMED_EXCERPT_LIMIT: usize = 8000;

/// Errors that can fail a pipeline invocation.
///
/// Every variant is fatal to the invocation: the caller gets either the
/// full batch of suggestions or one of these, never a silent empty list.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Required request fields missing or invalid (caller-side 400)
    #[error("invalid request: missing or invalid fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// Completion backend failure (transport, retries exhausted, bad envelope)
    #[error("completion backend error: {0}")]
    Completion(#[from] GeminiError),

    /// No usable JSON object recovered by the full repair cascade
    #[error("AI returned malformed or truncated JSON")]
    MalformedJson { excerpt: String },
}

impl SuggestError {
    /// Stable error code for caller-side mapping to user-visible messages.
    pub fn code(&self) -> &'static str {
        match self {
            SuggestError::Validation { .. } => "validation_error",
            SuggestError::Completion(e) => e.code(),
            SuggestError::MalformedJson { .. } => "ai_malformed_json",
        }
    }

    /// Whether a "try again shortly" message is appropriate, as opposed to
    /// a persistent prompt/parsing mismatch worth logging loudly.
    pub fn is_transient(&self) -> bool {
        match self {
            SuggestError::Completion(e) => e.is_transient(),
            _ => false,
        }
    }
}
