//! Command-line interface for debate-forge.
//!
//! Provides commands for submitting debate scenarios to the library (with
//! semantic duplicate detection) and inspecting the stored collection.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::arbiter::SemanticArbiter;
use crate::dedup::DeduplicationService;
use crate::library::{CandidateScenario, LibraryStore};
use crate::llm::GroqClient;

/// Default location of the scenario library.
const DEFAULT_LIBRARY_PATH: &str = "data/debate_templates.json";

/// Debate scenario library with semantic duplicate detection.
#[derive(Parser)]
#[command(name = "debate-forge")]
#[command(about = "Manage a library of binary-dilemma debate scenarios")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Submit a scenario; admits it unless a semantic duplicate exists.
    Submit(SubmitArgs),

    /// List the scenarios currently in the library.
    List(ListArgs),
}

/// Arguments for `debate-forge submit`.
#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Read the candidate scenario from a JSON file instead of flags.
    #[arg(short, long, conflicts_with_all = ["title", "context", "option_a", "option_b"])]
    pub file: Option<PathBuf>,

    /// Display title of the scenario.
    #[arg(long)]
    pub title: Option<String>,

    /// Free text describing the situation.
    #[arg(long)]
    pub context: Option<String>,

    /// First alternative.
    #[arg(long)]
    pub option_a: Option<String>,

    /// Second alternative.
    #[arg(long)]
    pub option_b: Option<String>,

    /// Path to the scenario library file.
    #[arg(long, default_value = DEFAULT_LIBRARY_PATH)]
    pub library: PathBuf,
}

/// Arguments for `debate-forge list`.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path to the scenario library file.
    #[arg(long, default_value = DEFAULT_LIBRARY_PATH)]
    pub library: PathBuf,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Submit(args) => submit(args).await,
        Commands::List(args) => list(args).await,
    }
}

async fn submit(args: SubmitArgs) -> anyhow::Result<()> {
    let candidate = if let Some(path) = &args.file {
        let text = tokio::fs::read_to_string(path).await?;
        serde_json::from_str::<CandidateScenario>(&text)?
    } else {
        CandidateScenario {
            title: args.title.unwrap_or_default(),
            context: args.context.unwrap_or_default(),
            option_a: args.option_a.unwrap_or_default(),
            option_b: args.option_b.unwrap_or_default(),
        }
    };

    let arbiter = match GroqClient::from_env() {
        Ok(client) => {
            info!(model = client.default_model(), "Using LLM-backed duplicate detection");
            SemanticArbiter::new(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "No LLM client available, duplicate detection degrades to exact text matching");
            SemanticArbiter::offline()
        }
    };

    let service = DeduplicationService::new(LibraryStore::new(args.library), Arc::new(arbiter));
    let report = service.submit(&candidate).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        std::process::exit(1);
    }

    Ok(())
}

async fn list(args: ListArgs) -> anyhow::Result<()> {
    let store = LibraryStore::new(args.library);
    let records = store.load().await?;

    if records.is_empty() {
        println!("Library is empty.");
        return Ok(());
    }

    for record in &records {
        let marker = if record.is_custom { "custom" } else { "seed" };
        println!("{:>4}  {:<50}  [{}]  {}", record.id, record.slug, marker, record.title);
    }
    println!("{} scenario(s).", records.len());

    Ok(())
}
