//! Cohere rerank provider.
//!
//! Scores (query, document) pairs with Cohere's cross-encoder rerank API.
//! The API returns results sorted by relevance with original indices; this
//! client maps them back into input order and defaults any index the
//! provider omitted to 0.0, so the output always has one score per input
//! text in the input's order.

use std::sync::Arc;
use std::time::Duration;

use docsqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::client::RerankClient;
use crate::gate::MinIntervalGate;
use crate::retry::with_retry;

const COHERE_RERANK_URL: &str = "https://api.cohere.com/v1/rerank";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

/// Cohere rerank client.
pub struct CohereReranker {
    client: reqwest::Client,
    api_key: String,
    model: String,
    gate: Arc<MinIntervalGate>,
}

impl CohereReranker {
    /// Create a client. `min_interval` throttles calls process-wide; pass
    /// `Duration::ZERO` to disable.
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        min_interval: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Model(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            gate: Arc::new(MinIntervalGate::new(min_interval)),
        })
    }

    async fn rerank_once(&self, query: &str, texts: &[String]) -> AppResult<Vec<f32>> {
        self.gate.acquire().await;

        let request = RerankRequest {
            model: &self.model,
            query,
            documents: texts,
            top_n: texts.len(),
            return_documents: false,
        };

        let response = self
            .client
            .post(COHERE_RERANK_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Model(format!("Cohere rerank request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Model(format!(
                "Cohere API error ({}): {}",
                status, body
            )));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| AppError::Model(format!("Failed to parse rerank response: {}", e)))?;

        Ok(scores_in_input_order(&parsed.results, texts.len()))
    }
}

/// Map provider results (index, score) back into input order, filling any
/// missing index with 0.0.
fn scores_in_input_order(results: &[RerankResult], len: usize) -> Vec<f32> {
    let mut scores = vec![0.0; len];
    for result in results {
        if result.index < len {
            scores[result.index] = result.relevance_score;
        }
    }
    scores
}

#[async_trait::async_trait]
impl RerankClient for CohereReranker {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn score_batch(&self, query: &str, texts: &[String]) -> AppResult<Vec<f32>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!("Reranking batch of {} texts with Cohere", texts.len());
        with_retry("cohere rerank", || self.rerank_once(query, texts)).await
    }
}
