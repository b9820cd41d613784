//! Audit-trace logging.

use std::sync::Arc;

use docsqa_core::AppResult;
use docsqa_storage::{NewTrace, Store, TraceAnswerRecord, TraceCitationRecord};
use uuid::Uuid;

use crate::types::{FilteredEvidence, GeneratedAnswer};

/// Model identifiers snapshotted into every trace.
#[derive(Debug, Clone)]
pub struct TraceModels {
    pub embedding_model: String,
    pub reranker_model: String,
    pub llm_model: String,
}

/// Persists one audit record per answered query.
pub struct TraceLogger {
    store: Arc<Store>,
    models: TraceModels,
}

impl TraceLogger {
    pub fn new(store: Arc<Store>, models: TraceModels) -> Self {
        Self { store, models }
    }

    /// Persist the trace with its citations and answer in one transaction
    /// and return the new trace id.
    ///
    /// Citations snapshot the evidence with the numbering the answer was
    /// generated against. A persistence failure fails the whole query.
    pub fn log(
        &self,
        query: &str,
        evidence: &FilteredEvidence,
        answer: &GeneratedAnswer,
        user_id: Option<&str>,
    ) -> AppResult<String> {
        let trace_id = Uuid::new_v4().to_string();

        let citations = evidence
            .evidence
            .iter()
            .map(|item| TraceCitationRecord {
                section_id: item.section.section_id.clone(),
                citation_number: item.citation_number,
                relevance_score: item.relevance_score,
                doc_title: item.section.doc_title.clone(),
                section_title: item.section.title.clone(),
                url: item.section.url.clone(),
            })
            .collect();

        self.store.log_trace(&NewTrace {
            trace_id: trace_id.clone(),
            query_text: query.to_string(),
            user_id: user_id.map(str::to_string),
            confidence: evidence.confidence.as_str().to_string(),
            embedding_model: self.models.embedding_model.clone(),
            reranker_model: self.models.reranker_model.clone(),
            llm_model: self.models.llm_model.clone(),
            citations,
            answer: TraceAnswerRecord {
                answer_text: answer.text.clone(),
                generation_time_ms: answer.generation_time_ms,
                token_count: answer.token_count,
            },
        })?;

        tracing::info!(
            "Trace logged: {} ({} citations)",
            trace_id,
            evidence.evidence.len()
        );
        Ok(trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, Evidence};
    use docsqa_storage::Section;

    fn models() -> TraceModels {
        TraceModels {
            embedding_model: "mock:trigram-v1".to_string(),
            reranker_model: "mock:overlap-v1".to_string(),
            llm_model: "mock:canned-v1".to_string(),
        }
    }

    #[test]
    fn test_log_produces_resolvable_trace() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let logger = TraceLogger::new(store.clone(), models());

        let evidence = FilteredEvidence {
            evidence: vec![Evidence {
                section: Section {
                    section_id: "s1".to_string(),
                    doc_id: "d1".to_string(),
                    title: Some("Execução".to_string()),
                    content: "Jenkins executa os testes.".to_string(),
                    embedding: None,
                    doc_title: "Guia".to_string(),
                    url: None,
                    breadcrumb: vec![],
                    has_code: false,
                    has_images: false,
                },
                relevance_score: 0.91,
                citation_number: 1,
            }],
            confidence: Confidence::VeryHigh,
        };
        let answer = GeneratedAnswer {
            text: "Use o pipeline [1].".to_string(),
            generation_time_ms: 120,
            token_count: 4,
        };

        let trace_id = logger
            .log("Como executar testes?", &evidence, &answer, Some("maria"))
            .unwrap();

        let detail = store.load_trace(&trace_id).unwrap().unwrap();
        assert_eq!(detail.query_text, "Como executar testes?");
        assert_eq!(detail.confidence, "very_high");
        assert_eq!(detail.user_id.as_deref(), Some("maria"));
        assert_eq!(detail.llm_model, "mock:canned-v1");
        assert_eq!(detail.citations.len(), 1);
        assert_eq!(detail.citations[0].section_id, "s1");
    }
}
