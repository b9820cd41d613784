//! Query pipeline for docsqa.
//!
//! One question flows through hybrid search (vector + keyword with score
//! fusion), cross-encoder reranking, confidence-tiered evidence filtering,
//! context building, cited answer generation, citation reconciliation and
//! trace logging. [`QueryService`] wires the stages together.

pub mod citations;
pub mod context;
pub mod filter;
pub mod fusion;
pub mod generator;
pub mod reranker;
pub mod searcher;
pub mod service;
pub mod trace;
pub mod types;
pub mod validator;

pub use service::QueryService;
pub use types::{
    Confidence, Evidence, EvidenceItem, FilteredEvidence, GeneratedAnswer, QueryRequest,
    QueryResponse, RankedSection, SearchResult,
};
