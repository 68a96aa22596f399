//! Shared types, error model, and configuration for the roadmap tooling.
//!
//! This crate is the foundation depended on by all other roadmap crates.
//! It provides:
//! - [`RoadmapError`] - the unified error type
//! - The content model ([`Document`], [`Category`], [`Resource`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, DEFAULT_CONFIG_FILE, IngestConfig, ValidateConfig, load_config,
    load_config_from,
};
pub use error::{Result, RoadmapError};
pub use types::{
    Category, CategoryMapping, Document, Resource, UNCATEGORIZED_NAME, UNCATEGORIZED_SLUG,
    default_category_mappings, normalize_url,
};
