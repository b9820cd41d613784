//! Document ingestion pipeline for docsqa.
//!
//! Scans a documentation directory for markdown files, parses them into
//! sections, describes embedded images through the vision provider (cached
//! by content hash), embeds section texts, and writes everything to the
//! store gated on the document content hash.

pub mod fetcher;
pub mod images;
pub mod markdown;
pub mod service;

pub use markdown::{ImageRef, ParsedDocument, ParsedSection};
pub use service::{IngestionReport, IngestionService};
