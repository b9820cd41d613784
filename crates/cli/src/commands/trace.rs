//! Trace command handler.

use clap::Args;
use docsqa_core::{AppError, AppResult, Settings};
use docsqa_storage::Store;

/// Show a persisted query trace
#[derive(Args, Debug)]
pub struct TraceCommand {
    /// Trace identifier, as returned by the ask command
    pub trace_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TraceCommand {
    pub async fn execute(self, settings: &Settings) -> AppResult<()> {
        let store = Store::open(&settings.database.path)?;

        let detail = store
            .load_trace(&self.trace_id)?
            .ok_or_else(|| AppError::Storage(format!("Trace not found: {}", self.trace_id)))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&detail)?);
            return Ok(());
        }

        println!("Trace:      {}", detail.trace_id);
        println!("Created:    {}", detail.created_at);
        println!("Query:      {}", detail.query_text);
        if let Some(user) = &detail.user_id {
            println!("User:       {}", user);
        }
        println!("Confidence: {}", detail.confidence);
        println!(
            "Models:     {} / {} / {}",
            detail.embedding_model, detail.reranker_model, detail.llm_model
        );

        println!("\nCitations:");
        for citation in &detail.citations {
            let title = citation
                .section_title
                .as_deref()
                .unwrap_or(citation.doc_title.as_str());
            println!(
                "  [{}] {} ({:.2})",
                citation.citation_number, title, citation.relevance_score
            );
        }

        println!(
            "\nAnswer ({} ms, {} words):\n{}",
            detail.generation_time_ms, detail.token_count, detail.answer_text
        );

        Ok(())
    }
}
