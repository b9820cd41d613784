//! SQLite storage engine for docsqa.
//!
//! Owns the persisted data model: documents and their sections (with
//! embedding vectors and a full-text index), the image-description cache,
//! and the append-only query audit log (traces, citations, answers).
//!
//! The query pipeline only reads sections; the ingestion pipeline and the
//! trace logger write, always inside a single transaction per logical unit.

pub mod records;
pub mod store;

pub use records::{
    DocumentStats, NewDocument, NewImage, NewSection, NewTrace, Section, TraceAnswerRecord,
    TraceCitationRecord, TraceDetail, TraceDetailCitation, WriteOutcome,
};
pub use store::Store;
