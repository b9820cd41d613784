//! Ollama provider implementations.
//!
//! Ollama is a local model runtime exposing a small HTTP API. It backs the
//! embedding, generation and vision capabilities.
//! API: https://github.com/ollama/ollama/blob/main/docs/api.md

use std::time::{Duration, Instant};

use base64::Engine as _;
use docsqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::client::{EmbeddingClient, Generation, GenerationClient, VisionClient};
use crate::retry::with_retry;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Request timeout for Ollama calls.
const REQUEST_TIMEOUT_SECS: u64 = 120;

fn build_client() -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Model(format!("Failed to create HTTP client: {}", e)))
}

fn resolve_base_url(base_url: Option<&str>) -> String {
    base_url
        .map(str::to_string)
        .or_else(|| std::env::var("OLLAMA_URL").ok())
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
}

async fn error_from_response(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::Model(format!("Ollama API error ({}): {}", status, body))
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding client (`/api/embeddings`).
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(model: impl Into<String>, dimensions: usize, base_url: Option<&str>) -> AppResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: resolve_base_url(base_url),
            model: model.into(),
            dimensions,
        })
    }

    async fn embed_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Ollama embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("Failed to parse embedding response: {}", e)))?;

        if parsed.embedding.len() != self.dimensions {
            return Err(AppError::Model(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                parsed.embedding.len()
            )));
        }

        Ok(parsed.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tracing::debug!("Embedding batch of {} texts via Ollama", texts.len());

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let embedding = with_retry("ollama embed", || self.embed_one(text)).await?;
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    options: GenerateOptions,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama generation client (`/api/generate`, non-streaming).
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaGenerator {
    pub fn new(
        model: impl Into<String>,
        base_url: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> AppResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: resolve_base_url(base_url),
            model: model.into(),
            temperature,
            max_tokens,
        })
    }

    async fn generate_once(&self, request: &GenerateRequest) -> AppResult<String> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Ollama generate request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("Failed to parse generate response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[async_trait::async_trait]
impl GenerationClient for OllamaGenerator {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> AppResult<Generation> {
        tracing::debug!(
            "Generating via Ollama (model: {}, system: {} chars, user: {} chars)",
            self.model,
            system_prompt.len(),
            user_prompt.len()
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: user_prompt.to_string(),
            system: Some(system_prompt.to_string()),
            images: Vec::new(),
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
            stream: false,
        };

        let start = Instant::now();
        let text = with_retry("ollama generate", || self.generate_once(&request)).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Ollama generation completed in {}ms ({} chars)",
            latency_ms,
            text.len()
        );

        Ok(Generation { text, latency_ms })
    }
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

/// Prompt used when describing documentation images.
const VISION_PROMPT: &str = "Descreva esta imagem técnica de forma detalhada para documentação. \
     Foque em conteúdo técnico, diagramas, e qualquer texto visível.";

/// Ollama vision client. Uses a multimodal model via `/api/generate` with
/// a base64-encoded image payload.
pub struct OllamaVision {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaVision {
    pub fn new(model: impl Into<String>, base_url: Option<&str>) -> AppResult<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: resolve_base_url(base_url),
            model: model.into(),
        })
    }

    async fn describe_once(&self, request: &GenerateRequest) -> AppResult<String> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Ollama vision request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("Failed to parse vision response: {}", e)))?;

        Ok(parsed.response)
    }
}

#[async_trait::async_trait]
impl VisionClient for OllamaVision {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn describe_image(&self, image: &[u8]) -> AppResult<String> {
        tracing::debug!("Describing image via Ollama ({} bytes)", image.len());

        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: VISION_PROMPT.to_string(),
            system: None,
            images: vec![encoded],
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: 1024,
            },
            stream: false,
        };

        let description = with_retry("ollama vision", || self.describe_once(&request)).await?;
        Ok(description.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_explicit_wins() {
        assert_eq!(
            resolve_base_url(Some("http://localhost:9999")),
            "http://localhost:9999"
        );
    }

    #[test]
    fn test_embedder_metadata() {
        let embedder = OllamaEmbedder::new("nomic-embed-text", 768, None).unwrap();
        assert_eq!(embedder.provider_name(), "ollama");
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    fn test_generate_request_serialization_skips_empty_images() {
        let request = GenerateRequest {
            model: "llama3.2".to_string(),
            prompt: "hi".to_string(),
            system: Some("sys".to_string()),
            images: Vec::new(),
            options: GenerateOptions {
                temperature: 0.1,
                num_predict: 100,
            },
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("images").is_none());
        assert_eq!(json["options"]["num_predict"], 100);
    }
}
