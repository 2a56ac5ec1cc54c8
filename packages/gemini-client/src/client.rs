//! The Gemini client: transport, retry, and truncation escalation.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::{truncate_body, GeminiError, Result};
use crate::retry::RetryPolicy;
use crate::types::{extract_text, finish_reason, Content, GenerationConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            policy: RetryPolicy::default(),
        }
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the model (default: gemini-2.5-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder().timeout(timeout).build().unwrap_or_default();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a completion and return the extracted text.
    ///
    /// If the first completion was truncated (`MAX_TOKENS`) and carried no
    /// usable text, makes exactly one follow-up attempt with a doubled
    /// output allowance before giving up.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String> {
        let mut response = self.generate(system, user, config).await?;

        if needs_escalation(&response) {
            warn!(
                max_output_tokens = config.max_output_tokens,
                "completion truncated with no text, retrying once with larger output allowance"
            );
            response = self.generate(system, user, &config.escalated()).await?;
        }

        extract_text(&response).ok_or_else(|| {
            let excerpt = truncate_body(&response.to_string());
            error!(excerpt = %excerpt, "AI response carried no text in any known shape");
            GeminiError::Parse("response carried no text in any known envelope shape".to_string())
        })
    }

    /// Run a single generateContent call with bounded retries and return
    /// the parsed response envelope.
    pub async fn generate(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<Value> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content::new("model", system), Content::new("user", user)],
            generation_config: config,
        };

        for attempt in 0..self.policy.max_attempts {
            debug!(attempt, model = %self.model, "sending generateContent request");

            let sent = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    if attempt + 1 == self.policy.max_attempts {
                        error!(error = %e, "AI request failed after retries");
                        return Err(GeminiError::RequestFailed(e.to_string()));
                    }
                    let wait = self.policy.delay(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        "network error calling AI backend, retrying"
                    );
                    sleep(wait).await;
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                let excerpt = truncate_body(&body_text);

                if self.policy.is_retryable(status.as_u16()) {
                    if attempt + 1 == self.policy.max_attempts {
                        error!(status = status.as_u16(), "AI API unavailable, retries exhausted");
                        return Err(GeminiError::ApiUnavailable {
                            status: status.as_u16(),
                            body: excerpt,
                        });
                    }
                    let wait = self.policy.delay(attempt);
                    warn!(
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        "transient AI API error, retrying"
                    );
                    sleep(wait).await;
                    continue;
                }

                error!(status = status.as_u16(), body = %excerpt, "non-transient AI API error");
                return Err(GeminiError::Api {
                    status: status.as_u16(),
                    body: excerpt,
                });
            }

            // Transport succeeded; a non-JSON body is a contract violation,
            // not a transient condition, so it is never retried.
            return response
                .json::<Value>()
                .await
                .map_err(|e| GeminiError::Parse(e.to_string()));
        }

        Err(GeminiError::RequestFailedFatal)
    }
}

/// Whether a response was truncated at the token limit without producing
/// any usable text, warranting the one-shot escalated retry.
pub fn needs_escalation(response: &Value) -> bool {
    matches!(
        finish_reason(response).as_deref(),
        Some("MAX_TOKENS") | Some("max_tokens")
    ) && extract_text(response).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_overrides() {
        let client = GeminiClient::new("test-key")
            .with_model("gemini-2.0-pro")
            .with_base_url("https://proxy.example.com/v1/");

        assert_eq!(client.model(), "gemini-2.0-pro");
        assert_eq!(client.base_url, "https://proxy.example.com/v1");
    }

    #[test]
    fn escalation_requires_truncation_and_no_text() {
        let truncated_empty = json!({
            "candidates": [{ "finishReason": "MAX_TOKENS", "content": { "parts": [] } }]
        });
        assert!(needs_escalation(&truncated_empty));

        let truncated_with_text = json!({
            "candidates": [{
                "finishReason": "MAX_TOKENS",
                "content": { "parts": [{ "text": "partial" }] }
            }]
        });
        assert!(!needs_escalation(&truncated_with_text));

        let complete = json!({
            "candidates": [{ "finishReason": "STOP", "content": { "parts": [] } }]
        });
        assert!(!needs_escalation(&complete));
    }
}
