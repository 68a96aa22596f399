//! Ingest pipeline: upstream README → parsed links → merged document → disk.

use std::path::PathBuf;

use roadmap_shared::{AppConfig, CategoryMapping, Result};
use roadmap_upstream::FetchOptions;
use tracing::{info, instrument, warn};

use crate::merge::{MergeStats, merge_resources};

/// Runtime ingest configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Curated document to read and rewrite.
    pub resources_path: PathBuf,
    /// Raw markdown listing to scrape.
    pub source_url: String,
    /// HTTP settings for the download.
    pub fetch: FetchOptions,
    /// Leave the document untouched and make no network calls.
    pub skip_download: bool,
    /// Heading → category table.
    pub categories: Vec<CategoryMapping>,
}

impl From<&AppConfig> for IngestOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            resources_path: config.content.resources_path.clone(),
            source_url: config.ingest.source_url.clone(),
            fetch: FetchOptions::from(&config.ingest),
            skip_download: config.ingest.skip_download,
            categories: config.ingest.categories.clone(),
        }
    }
}

/// What an ingest run did.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Download skipped; the document on disk was not modified.
    Skipped { existing_resources: usize },
    /// The merged document was written.
    Written {
        categories: usize,
        resources: usize,
        stats: MergeStats,
    },
}

/// Run the ingest pipeline.
///
/// 1. Load the current document (missing file → empty)
/// 2. Download the upstream listing, unless skipped
/// 3. Parse and merge against the current document
/// 4. Write the merged document
///
/// A failed download aborts before anything is written.
#[instrument(skip_all, fields(path = %options.resources_path.display()))]
pub async fn run_ingest(options: &IngestOptions) -> Result<IngestOutcome> {
    let existing = roadmap_storage::load(&options.resources_path)?;

    if options.skip_download {
        warn!("download skipped; leaving the content file untouched");
        return Ok(IngestOutcome::Skipped {
            existing_resources: existing.resource_count(),
        });
    }

    let readme = roadmap_upstream::fetch_listing(&options.source_url, &options.fetch).await?;
    let links = roadmap_upstream::parse_links(&readme);

    let merged = merge_resources(&links, &existing, &options.categories);
    info!(
        scraped = links.len(),
        preserved = merged.stats.preserved,
        added = merged.stats.added,
        unmapped = merged.stats.unmapped,
        duplicates = merged.stats.duplicates,
        "merged upstream links"
    );

    roadmap_storage::save(&options.resources_path, &merged.document)?;

    Ok(IngestOutcome::Written {
        categories: merged
            .document
            .categories
            .iter()
            .filter(|c| !c.resources.is_empty())
            .count(),
        resources: merged.document.resource_count(),
        stats: merged.stats,
    })
}
