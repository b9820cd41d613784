//! Provider factories.
//!
//! Each factory matches the configured provider name to a concrete client
//! and resolves required secrets from the environment. Construction happens
//! once at startup; the pipeline receives `Arc<dyn Trait>` handles.

use std::sync::Arc;
use std::time::Duration;

use docsqa_core::config::{
    EmbeddingSettings, LlmSettings, RerankerSettings, VisionSettings,
};
use docsqa_core::{AppError, AppResult};

use crate::client::{EmbeddingClient, GenerationClient, RerankClient, VisionClient};
use crate::cohere::CohereReranker;
use crate::mock::{MockEmbedder, MockGenerator, MockReranker, MockVision};
use crate::ollama::{OllamaEmbedder, OllamaGenerator, OllamaVision};

/// Create an embedding client for the configured provider.
pub fn create_embedder(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaEmbedder::new(
                &settings.model,
                settings.dimensions,
                settings.base_url.as_deref(),
            )?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockEmbedder::new(settings.dimensions))),
        other => Err(AppError::Config(format!(
            "Unsupported embedding provider: {}. Supported: ollama, mock",
            other
        ))),
    }
}

/// Create a rerank client for the configured provider.
pub fn create_reranker(settings: &RerankerSettings) -> AppResult<Arc<dyn RerankClient>> {
    match settings.provider.to_lowercase().as_str() {
        "cohere" => {
            let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
                AppError::Config(format!(
                    "{} environment variable not set",
                    settings.api_key_env
                ))
            })?;
            let client = CohereReranker::new(
                &settings.model,
                api_key,
                Duration::from_millis(settings.min_interval_ms),
            )?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockReranker::new())),
        other => Err(AppError::Config(format!(
            "Unsupported reranker provider: {}. Supported: cohere, mock",
            other
        ))),
    }
}

/// Create a generation client for the configured provider.
pub fn create_generator(settings: &LlmSettings) -> AppResult<Arc<dyn GenerationClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaGenerator::new(
                &settings.model,
                settings.base_url.as_deref(),
                settings.temperature,
                settings.max_tokens,
            )?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockGenerator::new())),
        other => Err(AppError::Config(format!(
            "Unsupported LLM provider: {}. Supported: ollama, mock",
            other
        ))),
    }
}

/// Create a vision client for the configured provider.
pub fn create_vision(settings: &VisionSettings) -> AppResult<Arc<dyn VisionClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaVision::new(&settings.model, settings.base_url.as_deref())?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockVision::new())),
        other => Err(AppError::Config(format!(
            "Unsupported vision provider: {}. Supported: ollama, mock",
            other
        ))),
    }
}
