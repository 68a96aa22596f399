//! CLI definition, tracing setup, progress bar, and the validate command.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use roadmap_core::validate::{ValidateOptions, ValidationReport, run_validation};
use roadmap_linkcheck::{NoopObserver, ProbeObserver, ProbeOutcome};
use roadmap_shared::load_config;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Validate content/resources.yaml.
#[derive(Parser)]
#[command(
    name = "roadmap-validate",
    version,
    about = "Check the curated resource list for duplicates, missing summaries, and dead links.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./roadmap.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Content file to validate.
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Only run structural checks; make no network calls.
    #[arg(
        long,
        env = "SKIP_LINK_STATUS",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub skip_status: bool,

    /// Number of concurrent link probes.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Print the full report as JSON on stdout.
    #[arg(long)]
    pub json: bool,

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

/// Resolve options from config + flags, run validation, and report.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    let mut options = ValidateOptions::from(&config);
    if let Some(content) = cli.content {
        options.resources_path = content;
    }
    if let Some(concurrency) = cli.concurrency {
        options.link_check.concurrency = usize::from(concurrency);
    }
    options.skip_status |= cli.skip_status;

    info!(
        content = %options.resources_path.display(),
        skip_status = options.skip_status,
        "validating resources"
    );

    let progress = (!options.skip_status && !cli.json && std::io::stderr().is_terminal())
        .then(|| Arc::new(CliProgress::new()));
    let observer: Arc<dyn ProbeObserver> = match &progress {
        Some(bar) => Arc::clone(bar) as Arc<dyn ProbeObserver>,
        None => Arc::new(NoopObserver),
    };

    let report = run_validation(&options, observer).await?;
    if let Some(bar) = &progress {
        bar.finish();
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    print_report(&report, cli.json)
}

/// Human-readable output. Problems go to stderr, the success line to stdout.
fn print_report(report: &ValidationReport, json: bool) -> Result<()> {
    if !report.violations.is_empty() {
        for violation in &report.violations {
            eprintln!("{violation}");
        }
        return Err(eyre!(
            "validation failed with {} structural issue(s)",
            report.violations.len()
        ));
    }

    if let Some(links) = report.links.as_ref().filter(|l| !l.is_success()) {
        eprintln!("Link check failures:");
        for failure in &links.failures {
            eprintln!("  {failure}");
        }
        return Err(eyre!(
            "{} of {} resource link(s) failed",
            links.failures.len(),
            links.checked
        ));
    }

    if json {
        return Ok(());
    }

    if report.resources == 0 {
        println!("No resources to validate.");
    } else if report.status_skipped {
        println!(
            "Validated structure of {} resources (link status checks skipped).",
            report.resources
        );
    } else {
        println!("Validated {} resource links.", report.resources);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress bar
// ---------------------------------------------------------------------------

/// Progress bar fed by link-check workers.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProbeObserver for CliProgress {
    fn probed(&self, url: &str, _outcome: &ProbeOutcome, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        self.bar.set_message(url.to_string());
    }
}
