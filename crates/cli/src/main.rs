//! docsqa CLI
//!
//! Command-line front end for the documentation question-answering
//! pipeline: ingest documents, ask questions, inspect traces and stats.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, StatsCommand, TraceCommand};
use docsqa_core::{logging, AppResult, Settings};
use std::path::PathBuf;

/// Documentation question answering over an indexed corpus
#[derive(Parser, Debug)]
#[command(name = "docsqa")]
#[command(about = "Ask questions over a technical documentation corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCSQA_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(long, global = true, env = "DOCSQA_DB_PATH")]
    db: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest markdown documents into the index
    Ingest(IngestCommand),

    /// Ask a question against the indexed corpus
    Ask(AskCommand),

    /// Show a persisted query trace
    Trace(TraceCommand),

    /// Show corpus and audit-log statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.database.path = db;
    }

    let log_level = if cli.verbose {
        Some("debug")
    } else {
        cli.log_level.as_deref()
    };
    logging::init_logging(
        log_level.or(Some(settings.logging.level.as_str())),
        cli.no_color,
    )?;

    tracing::debug!("Database: {:?}", settings.database.path);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Trace(_) => "trace",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&settings).await,
        Commands::Ask(cmd) => cmd.execute(&settings).await,
        Commands::Trace(cmd) => cmd.execute(&settings).await,
        Commands::Stats(cmd) => cmd.execute(&settings).await,
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {}", e);
    }

    result
}
