//! Upstream listing download and parsing.
//!
//! The ingest pipeline scrapes a third-party awesome-list README. This crate
//! downloads the raw markdown and turns it into [`LinkEntry`] triples; it knows
//! nothing about the curated document.

mod parser;

use std::time::Duration;

use reqwest::Client;
use roadmap_shared::{IngestConfig, Result, RoadmapError};
use tracing::{info, instrument};

pub use parser::{LinkEntry, parse_links};

/// Maximum number of redirects to follow when fetching the listing.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Configuration for the download.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// User-Agent header sent with the request.
    pub user_agent: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl From<&IngestConfig> for FetchOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Download the raw listing at `url`.
///
/// Any transport failure or non-2xx status is a [`RoadmapError::Fetch`].
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_listing(url: &str, opts: &FetchOptions) -> Result<String> {
    let client = build_client(opts)?;

    info!("downloading upstream listing");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RoadmapError::fetch(url, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RoadmapError::fetch(url, format!("HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| RoadmapError::fetch(url, format!("failed to read body: {e}")))?;

    info!(bytes = body.len(), "upstream listing downloaded");
    Ok(body)
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(opts.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(opts.timeout)
        .build()
        .map_err(|e| RoadmapError::Network(format!("failed to build HTTP client: {e}")))
}
