//! Ingest command handler.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use docsqa_core::{AppResult, Settings};
use docsqa_ingest::IngestionService;
use docsqa_storage::Store;

/// Ingest markdown documents into the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Specific files to ingest (default: every markdown file under the
    /// configured docs directory, pruning documents whose file is gone)
    #[arg(long)]
    pub file: Vec<PathBuf>,

    /// Remove these indexed documents by source file path instead of
    /// ingesting
    #[arg(long, conflicts_with = "file")]
    pub remove: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(self, settings: &Settings) -> AppResult<()> {
        let store = Arc::new(Store::open(&settings.database.path)?);

        if !self.remove.is_empty() {
            let mut removed = 0;
            for path in &self.remove {
                let outcome = store.remove_document(&path.to_string_lossy())?;
                removed += outcome.deleted;
            }
            if self.json {
                println!("{}", serde_json::json!({ "removed_documents": removed }));
            } else {
                println!("Removed {} documents", removed);
            }
            return Ok(());
        }

        let service = IngestionService::new(settings, store)?;

        let report = if self.file.is_empty() {
            service.ingest_all().await?
        } else {
            service.ingest_files(&self.file).await?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!(
                "Processed {} files: {} added, {} updated, {} removed ({} ms)",
                report.processed_files,
                report.added_documents,
                report.updated_documents,
                report.removed_documents,
                report.duration_ms
            );
        }

        Ok(())
    }
}
