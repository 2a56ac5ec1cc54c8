//! Error types for the Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Maximum length of an error body excerpt kept for diagnostics.
pub(crate) const ERROR_BODY_LIMIT: usize = 2000;

/// Gemini client errors.
///
/// Every variant maps to a stable string code via [`GeminiError::code`] so
/// callers can distinguish transient backend trouble from contract
/// violations without string-matching messages.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transient HTTP status (rate limit / overload), retries exhausted
    #[error("AI API unavailable after retries (status {status})")]
    ApiUnavailable { status: u16, body: String },

    /// Non-transient HTTP error, failed immediately
    #[error("AI API error (status {status})")]
    Api { status: u16, body: String },

    /// Transport succeeded but the payload violated the contract
    /// (body not JSON, or no usable text in any known envelope shape)
    #[error("failed to parse AI response: {0}")]
    Parse(String),

    /// Network-level failure after retries exhausted
    #[error("AI request failed after retries: {0}")]
    RequestFailed(String),

    /// Terminal state the retry loop should never reach
    #[error("AI request failed (fatal)")]
    RequestFailedFatal,
}

impl GeminiError {
    /// Stable error code for caller-side mapping.
    pub fn code(&self) -> &'static str {
        match self {
            GeminiError::Config(_) => "config_error",
            GeminiError::ApiUnavailable { .. } => "ai_api_unavailable",
            GeminiError::Api { .. } => "ai_api_error",
            GeminiError::Parse(_) => "ai_parse_error",
            GeminiError::RequestFailed(_) => "ai_request_failed",
            GeminiError::RequestFailedFatal => "ai_request_failed_fatal",
        }
    }

    /// Whether the failure is worth retrying from the caller's side
    /// (e.g. a "try again shortly" message rather than a bug report).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeminiError::ApiUnavailable { .. } | GeminiError::RequestFailed(_)
        )
    }
}

/// Truncate an error body for logging and error payloads.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        body.to_string()
    } else {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body[..end].to_string()
    }
}
