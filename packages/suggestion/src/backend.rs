//! The completion backend seam.
//!
//! The pipeline talks to its model through this trait so tests can drive it
//! with a scripted mock instead of the network.

use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError, GenerationConfig};

/// A chat-style completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the raw model text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeminiError>;
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeminiError> {
        GeminiClient::complete(self, system, user, config).await
    }
}
