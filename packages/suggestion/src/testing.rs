//! Test doubles for the suggestion pipeline.
//!
//! [`MockBackend`] replays a scripted sequence of responses and errors and
//! records every call it receives, so tests can assert on the prompts and
//! generation parameters the pipeline actually sent.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use gemini_client::{GeminiError, GenerationConfig};

use crate::backend::CompletionBackend;

/// One recorded call to [`MockBackend::complete`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// A scripted completion backend.
///
/// Responses and errors are consumed in the order they were queued; an
/// exhausted script fails the call rather than hanging the test.
#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<RwLock<VecDeque<Result<String, GeminiError>>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script.write().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: GeminiError) -> Self {
        self.script.write().unwrap().push_back(Err(error));
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeminiError> {
        self.calls.write().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        });
        self.script
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeminiError::RequestFailed("mock script exhausted".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_in_order_and_records_calls() {
        let backend = MockBackend::new()
            .with_response("first")
            .with_error(GeminiError::RequestFailed("down".into()));

        let config = GenerationConfig::default();
        let first = backend.complete("sys", "user one", &config).await;
        assert_eq!(first.unwrap(), "first");

        let second = backend.complete("sys", "user two", &config).await;
        assert!(second.is_err());

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].user, "user one");
        assert_eq!(calls[1].user, "user two");
        assert_eq!(calls[0].max_output_tokens, 2048);
    }

    #[tokio::test]
    async fn exhausted_script_fails_the_call() {
        let backend = MockBackend::new();
        let result = backend
            .complete("sys", "user", &GenerationConfig::default())
            .await;
        assert!(result.is_err());
        assert_eq!(backend.call_count(), 1);
    }
}
