//! Application configuration for the roadmap tooling.
//!
//! Config lives in an optional `roadmap.toml` in the working directory.
//! CLI flags and env toggles override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, RoadmapError};
use crate::types::{CategoryMapping, default_category_mappings};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "roadmap.toml";

// ---------------------------------------------------------------------------
// Config structs (matching roadmap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content file location.
    #[serde(default)]
    pub content: ContentConfig,

    /// Ingest pipeline settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Validation pipeline settings.
    #[serde(default)]
    pub validate: ValidateConfig,
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Path to the curated resources document.
    #[serde(default = "default_resources_path")]
    pub resources_path: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            resources_path: default_resources_path(),
        }
    }
}

fn default_resources_path() -> PathBuf {
    PathBuf::from("content").join("resources.yaml")
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Raw markdown listing to scrape.
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// User-Agent sent with the download request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Download timeout in seconds.
    #[serde(default = "default_ingest_timeout")]
    pub timeout_secs: u64,

    /// Skip the download and leave the content file untouched.
    #[serde(default)]
    pub skip_download: bool,

    /// Heading → category table. Order determines category order on write.
    #[serde(default = "default_category_mappings")]
    pub categories: Vec<CategoryMapping>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_ingest_timeout(),
            skip_download: false,
            categories: default_category_mappings(),
        }
    }
}

fn default_source_url() -> String {
    "https://raw.githubusercontent.com/hkirat/awesome-chess/master/README.md".into()
}
fn default_user_agent() -> String {
    "chess-roadmap-ingest".into()
}
fn default_ingest_timeout() -> u64 {
    30
}

/// `[validate]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Number of concurrent probe workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds (applies to HEAD and GET separately).
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Pause between a worker's consecutive probes.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Pause between a rejected HEAD and the fallback GET.
    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,

    /// Only run structural checks.
    #[serde(default)]
    pub skip_status: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_probe_timeout(),
            delay_ms: default_delay_ms(),
            fallback_delay_ms: default_fallback_delay_ms(),
            skip_status: false,
        }
    }
}

fn default_concurrency() -> usize {
    5
}
fn default_probe_timeout() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    50
}
fn default_fallback_delay_ms() -> u64 {
    250
}

impl AppConfig {
    /// Reject settings the pipelines cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.validate.concurrency == 0 {
            return Err(RoadmapError::config("validate.concurrency must be at least 1"));
        }

        let source = Url::parse(&self.ingest.source_url).map_err(|e| {
            RoadmapError::config(format!(
                "ingest.source_url '{}' is not a valid URL: {e}",
                self.ingest.source_url
            ))
        })?;
        if source.scheme() != "http" && source.scheme() != "https" {
            return Err(RoadmapError::config(format!(
                "ingest.source_url must be http(s), got '{}'",
                source.scheme()
            )));
        }

        if self.ingest.categories.iter().any(|m| m.slug.trim().is_empty()) {
            return Err(RoadmapError::config("ingest.categories entries need a slug"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config.
///
/// With an explicit path the file must exist. Without one, `roadmap.toml` in
/// the working directory is used when present, otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = match explicit {
        Some(path) => load_config_from(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_config_from(path)?
            } else {
                tracing::debug!(?path, "config file not found, using defaults");
                AppConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RoadmapError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        RoadmapError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
