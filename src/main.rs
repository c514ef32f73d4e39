use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use firm_finder_mcp::FirmFinderService;
use firm_finder_mcp::firms::FirmSource;
use firm_finder_mcp::firms::dictionary::load_dictionary_or_empty;
use firm_finder_mcp::search::{SearchConfig, SearchEngine};
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

/// MCP server for fuzzy, synonym-expanded search over a directory of law firms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of firm records
    #[arg(long, env = "FIRM_FINDER_FIRMS_FILE")]
    firms_file: Option<PathBuf>,

    /// Directory with exported sheet ranges (results.json, tags_conceptos.json)
    #[arg(long, env = "FIRM_FINDER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Spreadsheet to read through the Sheets values API
    #[arg(long, env = "FIRM_FINDER_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// API key for the Sheets values API
    #[arg(long, env = "FIRM_FINDER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Optional firm dictionary (JSON keyed by country::firm)
    #[arg(long, env = "FIRM_FINDER_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Search config file (defaults to ~/.firm-finder/config.toml when present)
    #[arg(long, env = "FIRM_FINDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one search and print the results as JSON
    Search {
        /// Free-text query
        query: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Print the terms a query expands to
    Expand {
        /// Query to expand
        query: String,
    },
    /// Print index and synonym statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let source = FirmSource::from_options(
        args.firms_file.clone(),
        args.data_dir.clone(),
        args.spreadsheet_id.clone(),
        args.api_key.clone(),
    )?;
    let config = SearchConfig::load(args.config.as_deref())?;

    if let Some(command) = args.command {
        return handle_command(command, &source, args.dictionary.as_deref(), config).await;
    }

    tracing::info!("Starting firm finder MCP server on stdio...");

    let firm_finder = FirmFinderService::initialize(&source, args.dictionary.as_deref(), config)
        .await
        .inspect_err(|e| {
            tracing::error!("startup failed: {:#}", e);
        })?;

    // Serve using stdio transport
    let service = firm_finder.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;
    Ok(())
}

async fn handle_command(
    command: Commands,
    source: &FirmSource,
    dictionary: Option<&std::path::Path>,
    config: SearchConfig,
) -> Result<()> {
    let catalog = source.load().await?;
    let dictionary = load_dictionary_or_empty(dictionary);
    let engine: SearchEngine = SearchEngine::build(catalog.firms(), &dictionary, config)?;

    let output = match command {
        Commands::Search { query, limit } => {
            serde_json::to_string_pretty(engine.search(&query, limit).as_ref())?
        }
        Commands::Expand { query } => serde_json::to_string_pretty(&engine.expand(&query))?,
        Commands::Stats => serde_json::to_string_pretty(&serde_json::json!({
            "index": engine.index_stats(),
            "synonyms": engine.synonym_stats(),
        }))?,
    };

    println!("{output}");
    Ok(())
}
