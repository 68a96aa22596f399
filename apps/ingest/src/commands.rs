//! CLI definition, tracing setup, and the ingest command.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use roadmap_core::ingest::{IngestOptions, IngestOutcome, run_ingest};
use roadmap_shared::{RoadmapError, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Refresh content/resources.yaml from the awesome-chess listing.
#[derive(Parser)]
#[command(
    name = "roadmap-ingest",
    version,
    about = "Merge the upstream awesome-chess links into the curated resource list.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./roadmap.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Content file to merge into.
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Upstream README URL.
    #[arg(long)]
    pub source_url: Option<String>,

    /// Leave the content file untouched and skip the download.
    #[arg(
        long,
        env = "SKIP_INGEST_DOWNLOAD",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub skip_download: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "roadmap=info",
        1 => "roadmap=debug",
        _ => "roadmap=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Resolve options from config + flags and run the ingest pipeline.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let mut options = IngestOptions::from(&config);
    if let Some(content) = cli.content {
        options.resources_path = content;
    }
    if let Some(source_url) = cli.source_url {
        options.source_url = source_url;
    }
    options.skip_download |= cli.skip_download;

    info!(
        source = %options.source_url,
        content = %options.resources_path.display(),
        "ingesting upstream resources"
    );

    match run_ingest(&options).await {
        Ok(IngestOutcome::Skipped { existing_resources }) => {
            println!(
                "Skipped download; {} left unchanged ({existing_resources} resources).",
                options.resources_path.display()
            );
            Ok(())
        }
        Ok(IngestOutcome::Written {
            categories,
            resources,
            stats,
        }) => {
            println!(
                "Wrote {resources} resources in {categories} categories to {}.",
                options.resources_path.display()
            );
            println!(
                "  preserved {}, added {}, unmapped {}, duplicates {}",
                stats.preserved, stats.added, stats.unmapped, stats.duplicates
            );
            Ok(())
        }
        Err(e @ RoadmapError::Fetch { .. }) => {
            eprintln!("Failed to download {}: {e}", options.source_url);
            eprintln!("Set SKIP_INGEST_DOWNLOAD=1 to run offline without touching the content file.");
            Err(eyre!("ingest aborted; content file left unchanged"))
        }
        Err(e) => Err(e.into()),
    }
}
