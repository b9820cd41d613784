//! Pipeline domain types.

use std::collections::HashMap;
use std::fmt;

use docsqa_storage::Section;
use serde::Serialize;

/// A section with its hybrid-search scores. Per-query, never persisted.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub section: Section,
    pub vector_score: f32,
    pub keyword_score: f32,
    pub combined_score: f32,
}

/// A section with its cross-encoder score, which supersedes the fused
/// combined score as the ranking signal for filtering.
#[derive(Debug, Clone)]
pub struct RankedSection {
    pub section: Section,
    pub rerank_score: f32,
}

/// A section admitted as evidence, with the citation number assigned at
/// filter time.
#[derive(Debug, Clone)]
pub struct Evidence {
    pub section: Section,
    pub relevance_score: f32,
    pub citation_number: u32,
}

/// Coarse label for how much qualifying evidence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Insufficient,
    Medium,
    High,
    VeryHigh,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Insufficient => "insufficient",
            Confidence::Medium => "medium",
            Confidence::High => "high",
            Confidence::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the evidence filter.
///
/// Invariant: citation numbers form the contiguous range 1..=len. The
/// evidence list is empty exactly when confidence is insufficient, and
/// the orchestrator refuses to generate an answer in that case.
#[derive(Debug, Clone)]
pub struct FilteredEvidence {
    pub evidence: Vec<Evidence>,
    pub confidence: Confidence,
}

/// Output of the answer generator. Ephemeral.
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub text: String,
    pub generation_time_ms: u64,
    /// Whitespace-delimited word count of the cleaned text, not true
    /// tokenization.
    pub token_count: u32,
}

/// One query as accepted from the presentation layer.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub question: String,
    pub max_sources: usize,
    pub user_id: Option<String>,
}

/// One evidence item as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceItem {
    pub citation_number: u32,
    pub doc_title: String,
    pub section_title: Option<String>,
    pub excerpt: String,
    pub url: Option<String>,
    pub relevance_score: f32,
}

/// The caller-facing query result.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub evidence: Vec<EvidenceItem>,
    pub confidence: Confidence,
    /// Absent when no trace was written (insufficient evidence).
    pub trace_id: Option<String>,
    pub generation_time_ms: u64,
    pub query: String,
    pub timestamp: String,
    pub models_used: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Confidence::VeryHigh).unwrap(),
            "\"very_high\""
        );
        assert_eq!(Confidence::Insufficient.as_str(), "insufficient");
        assert_eq!(Confidence::High.to_string(), "high");
    }
}
