//! Hybrid search over the section index.

use std::sync::Arc;

use docsqa_core::config::HybridSearchSettings;
use docsqa_core::AppResult;
use docsqa_providers::EmbeddingClient;
use docsqa_storage::Store;

use crate::fusion;
use crate::types::SearchResult;

/// Runs the vector and keyword sub-searches and fuses their scores.
pub struct HybridSearcher {
    store: Arc<Store>,
    embedder: Arc<dyn EmbeddingClient>,
    settings: HybridSearchSettings,
}

impl HybridSearcher {
    pub fn new(
        store: Arc<Store>,
        embedder: Arc<dyn EmbeddingClient>,
        settings: HybridSearchSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            settings,
        }
    }

    /// Search the index for candidate sections.
    ///
    /// Embedding-provider and storage errors are fatal for the query; there
    /// is no partial or cached fallback.
    pub async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;

        let vector_results = self
            .store
            .vector_search(&query_embedding, self.settings.top_k_candidates)?;
        tracing::debug!("Vector search found {} results", vector_results.len());

        let keyword_results = self
            .store
            .keyword_search(query, self.settings.top_k_candidates)?;
        tracing::debug!("Keyword search found {} results", keyword_results.len());

        let merged = fusion::fuse(
            vector_results,
            keyword_results,
            self.settings.vector_weight,
            self.settings.keyword_weight,
        );
        tracing::debug!("Merged to {} unique results", merged.len());

        Ok(merged)
    }
}
