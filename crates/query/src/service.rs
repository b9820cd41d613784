//! Query pipeline orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use docsqa_core::{AppError, AppResult, Settings};
use docsqa_providers::{create_embedder, create_generator, create_reranker};
use docsqa_storage::Store;

use crate::citations;
use crate::context::ContextBuilder;
use crate::filter::EvidenceFilter;
use crate::generator::AnswerGenerator;
use crate::reranker::Reranker;
use crate::searcher::HybridSearcher;
use crate::trace::{TraceLogger, TraceModels};
use crate::types::{Confidence, EvidenceItem, QueryRequest, QueryResponse};
use crate::validator::QueryValidator;

const INSUFFICIENT_EVIDENCE_MESSAGE: &str = "Não tenho informação suficiente nas fontes \
disponíveis para responder a essa pergunta com confiança. Tente reformular a pergunta ou \
use termos mais específicos relacionados com a documentação técnica.";

/// Wires the pipeline stages together and runs one query to completion.
///
/// Construction resolves every configured provider once; the service is
/// then shared across queries, which only touch immutable state and the
/// store.
pub struct QueryService {
    validator: QueryValidator,
    searcher: HybridSearcher,
    reranker: Reranker,
    filter: EvidenceFilter,
    context_builder: ContextBuilder,
    generator: AnswerGenerator,
    trace_logger: TraceLogger,
    models_used: HashMap<String, String>,
}

impl QueryService {
    pub fn new(settings: &Settings, store: Arc<Store>) -> AppResult<Self> {
        let embedder = create_embedder(&settings.models.embedding)?;
        let rerank_client = create_reranker(&settings.models.reranker)?;
        let llm_client = create_generator(&settings.models.llm)?;

        let models_used = settings.models_used();
        let trace_models = TraceModels {
            embedding_model: format!(
                "{}:{}",
                embedder.provider_name(),
                embedder.model_name()
            ),
            reranker_model: format!(
                "{}:{}",
                rerank_client.provider_name(),
                rerank_client.model_name()
            ),
            llm_model: format!(
                "{}:{}",
                llm_client.provider_name(),
                llm_client.model_name()
            ),
        };

        Ok(Self {
            validator: QueryValidator::from_settings(&settings.models.validator)?,
            searcher: HybridSearcher::new(
                store.clone(),
                embedder,
                settings.search.hybrid.clone(),
            ),
            reranker: Reranker::new(rerank_client),
            filter: EvidenceFilter::new(settings.search.evidence.clone()),
            context_builder: ContextBuilder::new(store.clone()),
            generator: AnswerGenerator::new(llm_client),
            trace_logger: TraceLogger::new(store, trace_models),
            models_used,
        })
    }

    /// Run one query and map the insufficient-evidence outcome to a
    /// non-error response. Provider and storage errors still propagate.
    pub async fn ask(&self, request: QueryRequest) -> AppResult<QueryResponse> {
        let question = request.question.clone();
        match self.run_pipeline(request).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_insufficient_evidence() => {
                Ok(self.insufficient_response(question, e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn run_pipeline(&self, request: QueryRequest) -> AppResult<QueryResponse> {
        tracing::info!(
            "Starting query pipeline: {:?} (max_sources: {})",
            request.question,
            request.max_sources
        );

        self.validator.validate(&request.question).await?;

        let search_results = self.searcher.search(&request.question).await?;
        tracing::info!("Found {} candidate sections", search_results.len());

        let ranked = self
            .reranker
            .rerank(&request.question, search_results)
            .await?;

        let filtered = self.filter.filter(ranked, request.max_sources);
        tracing::info!(
            "Filtered to {} evidence items (confidence: {})",
            filtered.evidence.len(),
            filtered.confidence
        );

        if filtered.confidence == Confidence::Insufficient {
            tracing::warn!("Insufficient evidence to answer question");
            return Err(AppError::InsufficientEvidence(
                INSUFFICIENT_EVIDENCE_MESSAGE.to_string(),
            ));
        }

        let context = self.context_builder.build(&filtered.evidence)?;
        let answer = self.generator.generate(&request.question, &context).await?;

        // The trace snapshots the numbering the answer was generated
        // against, before reconciliation.
        let trace_id = self.trace_logger.log(
            &request.question,
            &filtered,
            &answer,
            request.user_id.as_deref(),
        )?;

        let (answer_text, sorted_evidence) = citations::reconcile(&answer.text, filtered.evidence);

        let evidence_items = sorted_evidence
            .into_iter()
            .map(|item| EvidenceItem {
                citation_number: item.citation_number,
                doc_title: item.section.doc_title,
                section_title: item.section.title,
                excerpt: item.section.content,
                url: item.section.url,
                relevance_score: item.relevance_score,
            })
            .collect();

        Ok(QueryResponse {
            answer: answer_text,
            evidence: evidence_items,
            confidence: filtered.confidence,
            trace_id: Some(trace_id),
            generation_time_ms: answer.generation_time_ms,
            query: request.question,
            timestamp: Utc::now().to_rfc3339(),
            models_used: self.models_used.clone(),
        })
    }

    fn insufficient_response(&self, question: String, message: String) -> QueryResponse {
        QueryResponse {
            answer: message,
            evidence: Vec::new(),
            confidence: Confidence::Insufficient,
            trace_id: None,
            generation_time_ms: 0,
            query: question,
            timestamp: Utc::now().to_rfc3339(),
            models_used: self.models_used.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_settings() -> Settings {
        let mut settings = Settings::default();
        settings.models.embedding.provider = "mock".to_string();
        settings.models.reranker.provider = "mock".to_string();
        settings.models.llm.provider = "mock".to_string();
        settings.models.vision.provider = "mock".to_string();
        settings
    }

    #[test]
    fn test_service_constructs_with_mock_providers() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let service = QueryService::new(&mock_settings(), store).unwrap();
        assert_eq!(
            service.models_used.get("embedder").map(String::as_str),
            Some("mock:nomic-embed-text")
        );
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_insufficient_response() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let service = QueryService::new(&mock_settings(), store.clone()).unwrap();

        let response = service
            .ask(QueryRequest {
                question: "Como executar testes no Jenkins?".to_string(),
                max_sources: 5,
                user_id: None,
            })
            .await
            .unwrap();

        assert_eq!(response.confidence, Confidence::Insufficient);
        assert!(response.evidence.is_empty());
        assert!(response.trace_id.is_none());
        assert!(response.answer.contains("informação suficiente"));
        assert_eq!(store.stats().unwrap().traces, 0);
    }
}
