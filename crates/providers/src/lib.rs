//! Model provider clients for docsqa.
//!
//! Each model capability the pipeline consumes (embedding, reranking,
//! answer generation, vision) is abstracted behind an async trait with one
//! implementation per provider, selected at construction time by the
//! configured provider name. Retries and rate limiting live here, at the
//! provider boundary; pipeline code treats a post-retry failure as
//! terminal for the current query.

pub mod client;
pub mod cohere;
pub mod factory;
pub mod gate;
pub mod mock;
pub mod ollama;
pub mod retry;

pub use client::{EmbeddingClient, Generation, GenerationClient, RerankClient, VisionClient};
pub use factory::{create_embedder, create_generator, create_reranker, create_vision};
pub use gate::MinIntervalGate;
pub use mock::{MockEmbedder, MockGenerator, MockReranker, MockVision};
