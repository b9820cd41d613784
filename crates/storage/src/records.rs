//! Persisted record types.

use serde::{Deserialize, Serialize};

/// A contiguous unit of a document, the smallest retrievable unit.
///
/// Immutable once written except on document re-ingestion, which replaces
/// the document's sections wholesale. The query pipeline references
/// sections but never mutates them. Document title, url and breadcrumb are
/// denormalized onto each section for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub doc_id: String,
    pub title: Option<String>,
    pub content: String,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    pub doc_title: String,
    pub url: Option<String>,
    pub breadcrumb: Vec<String>,
    pub has_code: bool,
    pub has_images: bool,
}

/// An image reference attached to a new section.
#[derive(Debug, Clone)]
pub struct NewImage {
    /// Content hash of the image bytes (keys the description cache)
    pub image_hash: String,
    /// Path as written in the source document
    pub image_path: String,
    pub alt_text: Option<String>,
}

/// A section to be written during ingestion.
#[derive(Debug, Clone)]
pub struct NewSection {
    pub title: Option<String>,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub section_order: usize,
    pub has_code: bool,
    pub has_images: bool,
    pub images: Vec<NewImage>,
}

/// A document to be written during ingestion.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub url: Option<String>,
    pub file_path: String,
    pub breadcrumb: Vec<String>,
    pub content_hash: String,
    pub sections: Vec<NewSection>,
}

/// Result of one document write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// A citation snapshot to persist with a trace.
#[derive(Debug, Clone)]
pub struct TraceCitationRecord {
    pub section_id: String,
    pub citation_number: u32,
    pub relevance_score: f32,
    pub doc_title: String,
    pub section_title: Option<String>,
    pub url: Option<String>,
}

/// The answer record persisted with a trace.
#[derive(Debug, Clone)]
pub struct TraceAnswerRecord {
    pub answer_text: String,
    pub generation_time_ms: u64,
    pub token_count: u32,
}

/// A complete trace to persist: one trace row, one citation row per
/// evidence item, one answer row. Written in a single transaction.
#[derive(Debug, Clone)]
pub struct NewTrace {
    pub trace_id: String,
    pub query_text: String,
    pub user_id: Option<String>,
    pub confidence: String,
    pub embedding_model: String,
    pub reranker_model: String,
    pub llm_model: String,
    pub citations: Vec<TraceCitationRecord>,
    pub answer: TraceAnswerRecord,
}

/// A persisted trace loaded back for the trace-lookup operation.
#[derive(Debug, Clone, Serialize)]
pub struct TraceDetail {
    pub trace_id: String,
    pub query_text: String,
    pub user_id: Option<String>,
    pub confidence: String,
    pub created_at: String,
    pub embedding_model: String,
    pub reranker_model: String,
    pub llm_model: String,
    pub answer_text: String,
    pub generation_time_ms: u64,
    pub token_count: u32,
    pub citations: Vec<TraceDetailCitation>,
}

/// A citation row within a loaded trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceDetailCitation {
    pub citation_number: u32,
    pub section_id: String,
    pub relevance_score: f32,
    pub doc_title: String,
    pub section_title: Option<String>,
    pub url: Option<String>,
}

/// Corpus and audit-log counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DocumentStats {
    pub documents: usize,
    pub sections: usize,
    pub traces: usize,
}
