//! Command handlers.

mod ask;
mod ingest;
mod stats;
mod trace;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;
pub use trace::TraceCommand;
