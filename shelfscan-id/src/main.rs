//! shelfscan-id - identify books on a shelf from OCR output
//!
//! Reads the OCR JSON for one photograph, identifies each spine against an
//! Elasticsearch book catalogue and writes the spines and fragments as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use shelfscan_common::config::{load_config, TomlConfig};
use shelfscan_id::engine::{EngineSettings, IdentificationEngine};
use shelfscan_id::report::{load_shelf, write_report};
use shelfscan_id::services::{ElasticBackend, SearchClient, SearchSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for shelfscan-id
#[derive(Parser, Debug)]
#[command(name = "shelfscan-id")]
#[command(about = "Identify books from bookshelf OCR output")]
#[command(version, long_version = env!("SHELFSCAN_BUILD_INFO"))]
struct Args {
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// OCR JSON input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON report output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "SHELFSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Search backend base URL
    #[arg(long)]
    search_url: Option<String>,

    /// Catalogue index name
    #[arg(long)]
    index: Option<String>,
}

fn init_tracing(config: &TomlConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.logging.level.as_str() };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("shelfscan_id={0},shelfscan_common={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = args.search_url {
        config.search.url = url;
    }
    if let Some(index) = args.index {
        config.search.index = index;
    }

    init_tracing(&config, args.verbose);

    info!("Starting shelfscan-id {}", env!("SHELFSCAN_BUILD_INFO"));

    let (Some(input), Some(output)) = (args.input, args.output) else {
        println!("No files given");
        return Ok(());
    };

    let shelf = load_shelf(&input, config.extract.prune_ratio)
        .with_context(|| format!("Failed to read spines from {}", input.display()))?;

    info!(url = %config.search.url, index = %config.search.index, "Search backend");

    let backend = ElasticBackend::new(&config.search).context("Failed to create search backend")?;
    let client = Arc::new(SearchClient::new(
        Arc::new(backend),
        SearchSettings::from(&config.search),
    ));
    let engine = IdentificationEngine::new(client, EngineSettings::from(&config));

    let shelf = engine.identify_books(shelf).await;

    write_report(&output, &shelf)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    info!(
        resolved = shelf.resolved_count(),
        spines = shelf.len(),
        "Identification complete"
    );

    Ok(())
}
