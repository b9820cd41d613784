//! Capability traits for model providers.
//!
//! These traits define the contracts the query and ingestion pipelines
//! program against. Implementations may batch internally, but every call
//! blocks the invoking worker until it completes or fails.

use docsqa_core::{AppError, AppResult};

/// Result of one LLM generation call.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Wall-clock latency of the provider call
    pub latency_ms: u64,
}

/// Text embedding capability.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embedding dimensions, fixed per deployment
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input, order preserved.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Model("No embedding returned".to_string()))
    }
}

/// Cross-encoder reranking capability.
///
/// Contract: one score per input text, same order. An implementation must
/// tolerate the underlying provider omitting a score for an index by
/// defaulting it to 0.0; entries are never dropped or reordered, because
/// callers zip scores positionally with their candidates.
#[async_trait::async_trait]
pub trait RerankClient: Send + Sync {
    /// Provider name (e.g., "cohere", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Score each (query, text) pair.
    async fn score_batch(&self, query: &str, texts: &[String]) -> AppResult<Vec<f32>>;
}

/// Text generation capability.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Generate a completion for a system/user prompt pair.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> AppResult<Generation>;
}

/// Image description capability.
#[async_trait::async_trait]
pub trait VisionClient: Send + Sync {
    /// Provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Describe an image given its raw bytes.
    async fn describe_image(&self, image: &[u8]) -> AppResult<String>;
}
