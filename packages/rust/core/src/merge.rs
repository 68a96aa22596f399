//! Reconcile freshly scraped links against the curated document.
//!
//! Curation always wins: a URL that already exists keeps its id, summary and
//! category, whatever heading it is scraped under now. New URLs land in the
//! category mapped from their heading, or are dropped when the heading is
//! unknown.

use std::collections::{HashMap, HashSet};

use roadmap_shared::{
    Category, CategoryMapping, Document, Resource, UNCATEGORIZED_NAME, UNCATEGORIZED_SLUG,
    normalize_url,
};
use roadmap_upstream::LinkEntry;
use tracing::debug;

use crate::slug::slugify;

/// Id used when a title has no characters a slug can keep.
const FALLBACK_ID: &str = "resource";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Counters describing what a merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Resources whose URL already existed in the curated document.
    pub preserved: usize,
    /// Resources new to the curated document.
    pub added: usize,
    /// Scraped links dropped because their heading is not mapped.
    pub unmapped: usize,
    /// Scraped links dropped because their URL was already emitted in this run.
    pub duplicates: usize,
}

/// Output of [`merge_resources`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub document: Document,
    pub stats: MergeStats,
}

// ---------------------------------------------------------------------------
// Lookup tables built from the previous document
// ---------------------------------------------------------------------------

/// What the previous document knew about a URL.
struct Previous<'a> {
    id: String,
    summary: &'a str,
    slug: &'a str,
}

/// Immutable indexes over the previous document, keyed by normalized URL.
struct PreviousIndex<'a> {
    by_url: HashMap<String, Previous<'a>>,
    name_by_slug: HashMap<&'a str, &'a str>,
}

impl<'a> PreviousIndex<'a> {
    fn build(existing: &'a Document) -> Self {
        let mut by_url = HashMap::new();
        let mut name_by_slug = HashMap::new();

        for category in &existing.categories {
            name_by_slug
                .entry(category.slug.as_str())
                .or_insert(category.name.as_str());

            for resource in &category.resources {
                by_url.entry(resource.url_key()).or_insert_with(|| Previous {
                    id: if resource.id.trim().is_empty() {
                        base_id(&resource.title)
                    } else {
                        resource.id.clone()
                    },
                    summary: resource.summary.as_str(),
                    slug: category.slug.as_str(),
                });
            }
        }

        Self {
            by_url,
            name_by_slug,
        }
    }

    fn name_for(&self, slug: &str) -> Option<&'a str> {
        self.name_by_slug
            .get(slug)
            .copied()
            .filter(|name| !name.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Hands out ids unique within one merge run: `foo`, `foo-2`, `foo-3`, ...
#[derive(Default)]
struct IdAllocator {
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, base: String) -> String {
        let count = self.counters.entry(base.clone()).or_insert(0);
        *count += 1;

        let mut candidate = if *count == 1 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        while self.taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{base}-{count}");
        }

        self.taken.insert(candidate.clone());
        candidate
    }
}

fn base_id(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        FALLBACK_ID.to_string()
    } else {
        slug
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge scraped `fetched` links into `existing`, producing a new document.
///
/// Categories are ordered by `mappings` first (each slug once), then by first
/// encounter. Resources within a category are sorted by title, then URL.
pub fn merge_resources(
    fetched: &[LinkEntry],
    existing: &Document,
    mappings: &[CategoryMapping],
) -> MergeOutcome {
    let previous = PreviousIndex::build(existing);

    let mut by_heading: HashMap<&str, &CategoryMapping> = HashMap::new();
    for mapping in mappings {
        by_heading.entry(mapping.heading.as_str()).or_insert(mapping);
    }

    let mut categories: Vec<Category> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut ids = IdAllocator::default();
    let mut stats = MergeStats::default();

    for entry in fetched {
        let key = normalize_url(&entry.url);
        if emitted.contains(&key) {
            stats.duplicates += 1;
            debug!(url = %entry.url, "duplicate link in upstream listing, keeping first");
            continue;
        }

        let prior = previous.by_url.get(&key);
        let mapping = by_heading.get(entry.heading.as_str()).copied();

        let slug = match (prior, mapping) {
            (Some(prior), _) => prior.slug,
            (None, Some(mapping)) => mapping.slug.as_str(),
            (None, None) => {
                stats.unmapped += 1;
                debug!(heading = %entry.heading, url = %entry.url, "unmapped heading, dropping link");
                continue;
            }
        };
        let slug = if slug.trim().is_empty() {
            UNCATEGORIZED_SLUG
        } else {
            slug
        };

        let index = *position.entry(slug.to_string()).or_insert_with(|| {
            let name = previous
                .name_for(slug)
                .or(mapping.map(|m| m.name.as_str()).filter(|n| !n.trim().is_empty()))
                .unwrap_or(if slug == UNCATEGORIZED_SLUG {
                    UNCATEGORIZED_NAME
                } else {
                    slug
                });
            categories.push(Category::new(name, slug));
            categories.len() - 1
        });

        let id = match prior {
            Some(prior) => {
                stats.preserved += 1;
                ids.allocate(prior.id.clone())
            }
            None => {
                stats.added += 1;
                ids.allocate(base_id(&entry.title))
            }
        };

        categories[index].resources.push(Resource {
            id,
            summary: prior.map(|p| p.summary.to_string()).unwrap_or_default(),
            title: entry.title.clone(),
            url: entry.url.clone(),
        });
        emitted.insert(key);
    }

    let mut rank: HashMap<&str, usize> = HashMap::new();
    for mapping in mappings {
        let next = rank.len();
        rank.entry(mapping.slug.as_str()).or_insert(next);
    }
    // Stable sort keeps encounter order for categories outside the mapping.
    categories.sort_by_key(|c| rank.get(c.slug.as_str()).copied().unwrap_or(usize::MAX));

    for category in &mut categories {
        category
            .resources
            .sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.url.cmp(&b.url)));
    }

    MergeOutcome {
        document: Document { categories },
        stats,
    }
}
