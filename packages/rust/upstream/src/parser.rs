//! Parser for the upstream awesome-list README.
//!
//! The README uses setext-style headings followed by link lists:
//!
//! ```text
//! Books
//! ---
//! - [My System](https://example.com/my-system)
//! ```
//!
//! Only `- [title](url)` lines under a recognised heading are kept.

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single link scraped from the listing, tagged with its heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Heading text the link appeared under.
    pub heading: String,
    /// Link text.
    pub title: String,
    /// Link target.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `- [Title](url)` with optional trailing text.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^- \[([^\]]+)\]\(([^)]+)\)").expect("link regex")
});

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a README into ordered `(heading, title, url)` entries.
///
/// Order is preserved and duplicates are kept; deduplication is the merge
/// step's job.
pub fn parse_links(readme: &str) -> Vec<LinkEntry> {
    let lines: Vec<&str> = readme.lines().collect();
    let mut entries = Vec::new();
    let mut current_heading: Option<String> = None;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        index += 1;

        if trimmed.is_empty() {
            continue;
        }

        let next_is_divider = lines.get(index).is_some_and(|next| is_divider(next));
        if next_is_divider && looks_like_heading(line) {
            current_heading = Some(trimmed.to_string());
            // Consume the underline.
            index += 1;
            continue;
        }

        let Some(heading) = current_heading.as_ref() else {
            continue;
        };

        if let Some(caps) = LINK_RE.captures(trimmed) {
            entries.push(LinkEntry {
                heading: heading.clone(),
                title: caps[1].trim().to_string(),
                url: caps[2].trim().to_string(),
            });
        }
    }

    tracing::debug!(links = entries.len(), "parsed upstream listing");
    entries
}

/// A heading line is flush-left, not a list item, and not a divider itself.
fn looks_like_heading(line: &str) -> bool {
    !line.starts_with([' ', '\t', '-', '*']) && !is_divider(line)
}

/// A setext underline: three or more dashes and nothing else.
fn is_divider(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-')
}
