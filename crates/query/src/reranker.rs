//! Cross-encoder reranking stage.

use std::sync::Arc;

use docsqa_core::AppResult;
use docsqa_providers::RerankClient;

use crate::types::{RankedSection, SearchResult};

/// Pairs every search candidate with its cross-encoder score.
pub struct Reranker {
    client: Arc<dyn RerankClient>,
}

impl Reranker {
    pub fn new(client: Arc<dyn RerankClient>) -> Self {
        Self { client }
    }

    /// Score the full candidate set in one batch.
    ///
    /// Scores are zipped positionally with candidates, so order is
    /// preserved end to end. A candidate the provider returned no score
    /// for gets 0.0; entries are never dropped or reordered here.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
    ) -> AppResult<Vec<RankedSection>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.section.content.clone())
            .collect();

        let scores = self.client.score_batch(query, &texts).await?;
        tracing::debug!("Reranked {} candidates", candidates.len());

        Ok(candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| RankedSection {
                section: candidate.section,
                rerank_score: scores.get(i).copied().unwrap_or(0.0),
            })
            .collect())
    }
}
