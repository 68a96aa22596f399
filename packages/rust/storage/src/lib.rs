//! Flat-file storage for the curated resources document.
//!
//! `resources.yaml` is the single source of truth for curated content. The
//! whole file is read into a [`Document`], transformed in memory, and written
//! back in one piece.
//!
//! **Access rules:**
//! - Ingest: [`load`] (a missing file is a first run) then [`save`]
//! - Validation: [`load_existing`] (a missing file is an error)

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use roadmap_shared::{Document, Result, RoadmapError};
use tracing::{debug, instrument};

/// Load the document at `path`, returning an empty document if the file does not exist.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<Document> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_document(path, &content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("content file not found, starting from an empty document");
            Ok(Document::default())
        }
        Err(e) => Err(RoadmapError::io(path, e)),
    }
}

/// Load the document at `path`; a missing file is an I/O error.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_existing(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| RoadmapError::io(path, e))?;
    parse_document(path, &content)
}

/// Decode YAML content. Blank content is an empty document.
fn parse_document(path: &Path, content: &str) -> Result<Document> {
    if content.trim().is_empty() {
        return Ok(Document::default());
    }

    let document: Document = serde_yaml::from_str(content)
        .map_err(|e| RoadmapError::parse(format!("{}: {e}", path.display())))?;

    debug!(
        categories = document.categories.len(),
        resources = document.resource_count(),
        "loaded content file"
    );
    Ok(document)
}

/// Serialize `document` to YAML. Categories without resources are dropped;
/// everything else is emitted in the order given.
pub fn to_yaml(document: &Document) -> Result<String> {
    let pruned = Document {
        categories: document
            .categories
            .iter()
            .filter(|c| !c.resources.is_empty())
            .cloned()
            .collect(),
    };

    serde_yaml::to_string(&pruned)
        .map_err(|e| RoadmapError::parse(format!("failed to serialize document: {e}")))
}

/// Overwrite `path` with `document` (write to temp, then rename).
#[instrument(skip_all, fields(path = %path.display()))]
pub fn save(path: &Path, document: &Document) -> Result<()> {
    let output = to_yaml(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RoadmapError::io(parent, e))?;
    }

    let temp = temp_path(path);
    std::fs::write(&temp, &output).map_err(|e| RoadmapError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(RoadmapError::io(path, e));
    }

    debug!(bytes = output.len(), "wrote content file");
    Ok(())
}

/// Sibling temp file used for the atomic replace.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new("document"))
        .to_string_lossy();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_shared::{Category, Resource};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roadmap-store-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn resource(id: &str, title: &str, url: &str, summary: &str) -> Resource {
        Resource {
            id: id.into(),
            summary: summary.into(),
            title: title.into(),
            url: url.into(),
        }
    }

    #[test]
    fn missing_file_is_empty_document() {
        let dir = temp_dir();
        let doc = load(&dir.join("resources.yaml")).expect("load");
        assert!(doc.categories.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_error_for_load_existing() {
        let dir = temp_dir();
        let result = load_existing(&dir.join("resources.yaml"));
        assert!(matches!(result, Err(RoadmapError::Io { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_file_is_empty_document() {
        let dir = temp_dir();
        let path = dir.join("resources.yaml");
        std::fs::write(&path, "\n  \n").expect("write");
        assert_eq!(load(&path).expect("load"), Document::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_content_is_a_parse_error() {
        let dir = temp_dir();
        let path = dir.join("resources.yaml");

        for bad in [
            "just a string",
            "resources: []",
            "categories: 7",
            "categories:\n  - name: Books\n    resources:\n      - id: x\n",
        ] {
            std::fs::write(&path, bad).expect("write");
            let err = load(&path).unwrap_err();
            assert!(
                matches!(err, RoadmapError::Parse { .. }),
                "expected parse error for {bad:?}, got {err:?}"
            );
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn fixture_loads_with_defaults_for_optional_fields() {
        let doc = load(Path::new("../../../fixtures/content/resources.yaml")).expect("fixture");
        assert_eq!(doc.categories.len(), 2);
        assert_eq!(doc.categories[0].slug, "books");
        let no_id = doc
            .resources()
            .find(|r| r.title == "Chess Fundamentals")
            .expect("resource without id");
        assert!(no_id.id.is_empty());
        assert!(no_id.summary.is_empty());
    }

    #[test]
    fn save_drops_empty_categories_and_round_trips() {
        let dir = temp_dir();
        let path = dir.join("content").join("resources.yaml");

        let mut books = Category::new("Books", "books");
        books.resources.push(resource(
            "my-system",
            "My System",
            "https://example.com/my-system",
            "Nimzowitsch's classic.",
        ));
        let empty = Category::new("Talks", "strategy");
        let doc = Document {
            categories: vec![books.clone(), empty],
        };

        save(&path, &doc).expect("save");
        assert!(!dir.join("content").join(".resources.yaml.tmp").exists());

        let reloaded = load(&path).expect("reload");
        assert_eq!(reloaded.categories, vec![books]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn yaml_keys_are_emitted_in_sorted_order() {
        let mut tools = Category::new("Tools", "tools");
        tools
            .resources
            .push(resource("board", "Board", "https://example.com/board", "A board."));
        let yaml = to_yaml(&Document {
            categories: vec![tools],
        })
        .expect("serialize");

        let keys: Vec<&str> = yaml
            .lines()
            .map(|l| l.trim_start_matches([' ', '-']).trim_start())
            .filter_map(|l| l.split_once(':').map(|(k, _)| k))
            .collect();
        assert_eq!(
            keys,
            ["categories", "name", "resources", "id", "summary", "title", "url", "slug"]
        );
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = temp_dir();
        let path = dir.join("resources.yaml");
        std::fs::write(&path, "categories: []\n# stale comment\n").expect("write");

        let mut books = Category::new("Books", "books");
        books
            .resources
            .push(resource("a", "A", "https://a.example", "Summary."));
        save(&path, &Document { categories: vec![books] }).expect("save");

        let written = std::fs::read_to_string(&path).expect("read");
        assert!(!written.contains("stale comment"));
        assert_eq!(load(&path).expect("load").resource_count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = temp_dir();
        // A non-empty directory at the target path makes the rename fail.
        let path = dir.join("resources.yaml");
        std::fs::create_dir_all(path.join("occupied")).expect("create blocking dir");

        let mut books = Category::new("Books", "books");
        books
            .resources
            .push(resource("a", "A", "https://a.example", "Summary."));
        let result = save(&path, &Document { categories: vec![books] });

        assert!(matches!(result, Err(RoadmapError::Io { .. })));
        assert!(!temp_path(&path).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
