//! Ask command handler.

use std::sync::Arc;

use clap::Args;
use docsqa_core::{AppResult, Settings};
use docsqa_query::{QueryRequest, QueryResponse, QueryService};
use docsqa_storage::Store;

/// Ask a question against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Maximum number of sources to return
    #[arg(long, default_value_t = 5)]
    pub max_sources: usize,

    /// User identifier recorded in the trace
    #[arg(long)]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(self, settings: &Settings) -> AppResult<()> {
        let store = Arc::new(Store::open(&settings.database.path)?);
        let service = QueryService::new(settings, store)?;

        let response = service
            .ask(QueryRequest {
                question: self.question,
                max_sources: self.max_sources,
                user_id: self.user,
            })
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_response(&response);
        }

        Ok(())
    }
}

fn print_response(response: &QueryResponse) {
    println!("{}", response.answer);

    if !response.evidence.is_empty() {
        println!("\nFontes:");
        for item in &response.evidence {
            let title = item
                .section_title
                .as_deref()
                .unwrap_or(item.doc_title.as_str());
            match &item.url {
                Some(url) => println!(
                    "  [{}] {} - {} ({:.2})",
                    item.citation_number, title, url, item.relevance_score
                ),
                None => println!(
                    "  [{}] {} ({:.2})",
                    item.citation_number, title, item.relevance_score
                ),
            }
        }
    }

    println!("\nConfiança: {}", response.confidence);
    if let Some(trace_id) = &response.trace_id {
        println!("Trace: {}", trace_id);
    }
}
