//! Stats command handler.

use clap::Args;
use docsqa_core::{AppResult, Settings};
use docsqa_storage::Store;

/// Show corpus and audit-log statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(self, settings: &Settings) -> AppResult<()> {
        let store = Store::open(&settings.database.path)?;
        let stats = store.stats()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Documents: {}", stats.documents);
            println!("Sections:  {}", stats.sections);
            println!("Traces:    {}", stats.traces);
        }

        Ok(())
    }
}
