//! Content model for `resources.yaml`.
//!
//! Struct fields are declared in sorted key order so that serialized documents
//! keep the alphabetical key layout of the curated file.

use serde::{Deserialize, Serialize};

/// Slug used when a resource lands in no known category.
pub const UNCATEGORIZED_SLUG: &str = "uncategorized";

/// Display name paired with [`UNCATEGORIZED_SLUG`].
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A single curated external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable slug, unique within its category. Join key across rebuilds.
    #[serde(default)]
    pub id: String,
    /// Human-written summary. Empty before curation.
    #[serde(default)]
    pub summary: String,
    /// Display title.
    pub title: String,
    /// Target URL. Dedup key after [`normalize_url`].
    pub url: String,
}

impl Resource {
    /// Normalized dedup key for this resource's URL.
    pub fn url_key(&self) -> String {
        normalize_url(&self.url)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A named, ordered bucket of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display label; may be renamed freely.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Stable identity of the category.
    pub slug: String,
}

impl Category {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            slug: slug.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Root structure of `resources.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub categories: Vec<Category>,
}

impl Document {
    /// Iterate every resource in document order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.categories.iter().flat_map(|c| c.resources.iter())
    }

    /// Total number of resources across all categories.
    pub fn resource_count(&self) -> usize {
        self.categories.iter().map(|c| c.resources.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Heading → category mapping
// ---------------------------------------------------------------------------

/// Maps an upstream README heading onto a curated category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    /// Heading text exactly as it appears upstream.
    pub heading: String,
    /// Category display name.
    pub name: String,
    /// Category slug.
    pub slug: String,
}

impl CategoryMapping {
    fn new(heading: &str, name: &str, slug: &str) -> Self {
        Self {
            heading: heading.into(),
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// The built-in heading table. Order determines category order on write.
pub fn default_category_mappings() -> Vec<CategoryMapping> {
    vec![
        CategoryMapping::new("Books", "Books", "books"),
        CategoryMapping::new("Move Validators", "Engines/Dev", "engines-dev"),
        CategoryMapping::new("Bots", "Engines/Dev", "engines-dev"),
        CategoryMapping::new("FEN Parsers", "Notation / PGN / FEN", "notation"),
        CategoryMapping::new("Board Notations", "Notation / PGN / FEN", "notation"),
        CategoryMapping::new("Boards", "Tools", "tools"),
        CategoryMapping::new("Pieces", "Tools", "tools"),
        CategoryMapping::new("Websites", "Communities", "communities"),
        CategoryMapping::new("Talks", "Strategy", "strategy"),
    ]
}

/// Normalize a URL for deduplication (trim whitespace, lowercase).
pub fn normalize_url(url: &str) -> String {
    url.trim().to_lowercase()
}
