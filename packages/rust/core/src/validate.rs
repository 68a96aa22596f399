//! Validation pipeline: structural checks, then link liveness probing.
//!
//! Every resource is evaluated; nothing fails fast. Structural violations stop
//! the run before any network traffic.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use roadmap_linkcheck::{
    HttpProber, LinkCheckConfig, LinkCheckReport, Probe, ProbeObserver, check_links,
};
use roadmap_shared::{AppConfig, Document, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

/// A structural problem in the curated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A URL seen earlier in the document (one per extra occurrence).
    DuplicateUrl {
        url: String,
        title: String,
        first_title: String,
    },
    /// Blank or missing summary.
    MissingSummary { title: String, url: String },
    /// Blank `id`, `title` or `url`.
    MissingField {
        field: &'static str,
        category: String,
        title: String,
        url: String,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateUrl {
                url,
                title,
                first_title,
            } => write!(
                f,
                "Duplicate URL detected: {url} ({title}; first listed as {first_title})"
            ),
            Self::MissingSummary { title, url } => {
                write!(f, "Missing summary for: {title} ({url})")
            }
            Self::MissingField {
                field,
                category,
                title,
                url,
            } => write!(f, "Missing {field} in category '{category}': {title} ({url})"),
        }
    }
}

/// Collect every structural violation in document order.
///
/// Duplicates are reported once per extra occurrence: a URL listed three
/// times yields two violations.
pub fn check_structure(document: &Document) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut first_title_by_url: HashMap<String, &str> = HashMap::new();

    for category in &document.categories {
        for resource in &category.resources {
            for (field, value) in [
                ("id", &resource.id),
                ("title", &resource.title),
                ("url", &resource.url),
            ] {
                if value.trim().is_empty() {
                    violations.push(Violation::MissingField {
                        field,
                        category: category.slug.clone(),
                        title: resource.title.clone(),
                        url: resource.url.clone(),
                    });
                }
            }

            if !resource.url.trim().is_empty() {
                match first_title_by_url.get(&resource.url_key()) {
                    Some(first_title) => violations.push(Violation::DuplicateUrl {
                        url: resource.url.clone(),
                        title: resource.title.clone(),
                        first_title: (*first_title).to_string(),
                    }),
                    None => {
                        first_title_by_url.insert(resource.url_key(), resource.title.as_str());
                    }
                }
            }

            if resource.summary.trim().is_empty() {
                violations.push(Violation::MissingSummary {
                    title: resource.title.clone(),
                    url: resource.url.clone(),
                });
            }
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runtime validation configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Curated document to check.
    pub resources_path: PathBuf,
    /// Run structural checks only.
    pub skip_status: bool,
    /// Probe pool settings.
    pub link_check: LinkCheckConfig,
}

impl From<&AppConfig> for ValidateOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            resources_path: config.content.resources_path.clone(),
            skip_status: config.validate.skip_status,
            link_check: LinkCheckConfig::from(&config.validate),
        }
    }
}

/// Aggregate result of a validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Resources in the document.
    pub resources: usize,
    /// Structural violations. Non-empty means probing did not run.
    pub violations: Vec<Violation>,
    /// Probe results; `None` when probing did not run.
    pub links: Option<LinkCheckReport>,
    /// Probing was skipped by configuration.
    pub status_skipped: bool,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.violations.is_empty() && self.links.as_ref().is_none_or(|l| l.is_success())
    }
}

/// Run the validation pipeline with the HTTP prober.
pub async fn run_validation(
    options: &ValidateOptions,
    observer: Arc<dyn ProbeObserver>,
) -> Result<ValidationReport> {
    // Build the client lazily so offline runs never touch the network stack.
    if options.skip_status {
        return run_validation_with(options, Arc::new(NeverProbe), observer).await;
    }
    let prober = Arc::new(HttpProber::new(&options.link_check)?);
    run_validation_with(options, prober, observer).await
}

/// Run the validation pipeline with a caller-supplied probe.
///
/// 1. Load the document (a missing file is an error)
/// 2. Structural checks; stop if any violation
/// 3. Probe every URL, unless skipped
#[instrument(skip_all, fields(path = %options.resources_path.display()))]
pub async fn run_validation_with<P: Probe>(
    options: &ValidateOptions,
    probe: Arc<P>,
    observer: Arc<dyn ProbeObserver>,
) -> Result<ValidationReport> {
    let document = roadmap_storage::load_existing(&options.resources_path)?;
    let resources = document.resource_count();

    let mut report = ValidationReport {
        resources,
        violations: Vec::new(),
        links: None,
        status_skipped: options.skip_status,
    };

    if resources == 0 {
        info!("no resources to validate");
        return Ok(report);
    }

    report.violations = check_structure(&document);
    if !report.violations.is_empty() {
        warn!(
            violations = report.violations.len(),
            "structural checks failed; skipping link probes"
        );
        return Ok(report);
    }

    if options.skip_status {
        warn!("status probes skipped; validated document structure only");
        return Ok(report);
    }

    let urls = document.resources().map(|r| r.url.clone()).collect();
    report.links = Some(check_links(probe, urls, &options.link_check, observer).await);
    Ok(report)
}

/// Stand-in probe for structure-only runs; never invoked.
struct NeverProbe;

impl Probe for NeverProbe {
    async fn probe(&self, _url: &str) -> roadmap_linkcheck::ProbeOutcome {
        roadmap_linkcheck::ProbeOutcome::Error("link probing is disabled".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_linkcheck::{NoopObserver, ProbeOutcome};
    use roadmap_shared::{Category, Resource, RoadmapError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use uuid::Uuid;

    fn resource(id: &str, title: &str, url: &str, summary: &str) -> Resource {
        Resource {
            id: id.into(),
            summary: summary.into(),
            title: title.into(),
            url: url.into(),
        }
    }

    fn document(resources: Vec<Resource>) -> Document {
        let mut category = Category::new("Books", "books");
        category.resources = resources;
        Document {
            categories: vec![category],
        }
    }

    /// Probe that counts calls and fails URLs containing "dead".
    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    impl Probe for CountingProbe {
        async fn probe(&self, url: &str) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("dead") {
                ProbeOutcome::Status(404)
            } else {
                ProbeOutcome::Status(200)
            }
        }
    }

    fn write_document(doc: &Document) -> (PathBuf, ValidateOptions) {
        let dir = std::env::temp_dir().join(format!("roadmap-validate-test-{}", Uuid::now_v7()));
        let path = dir.join("resources.yaml");
        roadmap_storage::save(&path, doc).expect("save document");

        let mut options = ValidateOptions::from(&AppConfig::default());
        options.resources_path = path;
        options.link_check.delay = Duration::ZERO;
        options.link_check.fallback_delay = Duration::ZERO;
        (dir, options)
    }

    #[test]
    fn reports_every_duplicate_and_missing_summary() {
        let doc = document(vec![
            resource("a", "Alpha", "https://a.example", "First."),
            resource("a-2", "Alpha Mirror", "https://A.example ", "Second."),
            resource("b", "Beta", "https://b.example", ""),
        ]);

        let violations = check_structure(&doc);
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], Violation::DuplicateUrl { .. }));
        assert_eq!(
            violations[1].to_string(),
            "Missing summary for: Beta (https://b.example)"
        );
    }

    #[test]
    fn duplicates_reported_once_per_extra_occurrence() {
        let doc = Document {
            categories: vec![
                {
                    let mut c = Category::new("Books", "books");
                    c.resources = vec![
                        resource("x", "X", "https://x.example", "s"),
                        resource("x2", "X2", "https://x.example", "s"),
                    ];
                    c
                },
                {
                    let mut c = Category::new("Tools", "tools");
                    c.resources = vec![resource("x3", "X3", "https://X.EXAMPLE", "s")];
                    c
                },
            ],
        };

        let violations = check_structure(&doc);
        assert_eq!(violations.len(), 2);
        for violation in &violations {
            match violation {
                Violation::DuplicateUrl { first_title, .. } => assert_eq!(first_title, "X"),
                other => panic!("unexpected violation {other:?}"),
            }
        }
    }

    #[test]
    fn blank_required_fields_are_violations() {
        let doc = document(vec![resource("", "Untitled id", "https://c.example", "ok")]);
        let violations = check_structure(&doc);
        assert_eq!(
            violations,
            vec![Violation::MissingField {
                field: "id",
                category: "books".into(),
                title: "Untitled id".into(),
                url: "https://c.example".into(),
            }]
        );
    }

    #[test]
    fn clean_document_has_no_violations() {
        let doc = document(vec![
            resource("a", "Alpha", "https://a.example", "First."),
            resource("b", "Beta", "https://b.example", "Second."),
        ]);
        assert!(check_structure(&doc).is_empty());
    }

    #[test]
    fn violations_serialize_with_kind_tag() {
        let violation = Violation::MissingSummary {
            title: "Beta".into(),
            url: "https://b.example".into(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["kind"], "missing_summary");
        assert_eq!(json["url"], "https://b.example");
    }

    #[tokio::test]
    async fn structural_failures_skip_probing() {
        let (dir, options) = write_document(&document(vec![
            resource("a", "Alpha", "https://a.example", ""),
        ]));
        let probe = Arc::new(CountingProbe::default());

        let report = run_validation_with(&options, probe.clone(), Arc::new(NoopObserver))
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.violations.len(), 1);
        assert!(report.links.is_none());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn skip_status_makes_zero_probe_calls() {
        let (dir, mut options) = write_document(&document(vec![
            resource("a", "Alpha", "https://a.example", "First."),
            resource("dead", "Dead", "https://dead.example", "Gone."),
        ]));
        options.skip_status = true;
        let probe = Arc::new(CountingProbe::default());

        let report = run_validation_with(&options, probe.clone(), Arc::new(NoopObserver))
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(report.status_skipped);
        assert!(report.links.is_none());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn skip_status_sends_no_http_requests() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (dir, mut options) = write_document(&document(vec![resource(
            "a",
            "Alpha",
            &format!("{}/alpha", server.uri()),
            "First.",
        )]));
        options.skip_status = true;

        let report = run_validation(&options, Arc::new(NoopObserver)).await.unwrap();
        assert!(report.is_success());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn probe_failures_fail_the_report() {
        let (dir, options) = write_document(&document(vec![
            resource("a", "Alpha", "https://a.example", "First."),
            resource("dead", "Dead", "https://dead.example", "Gone."),
        ]));
        let probe = Arc::new(CountingProbe::default());

        let report = run_validation_with(&options, probe.clone(), Arc::new(NoopObserver))
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
        let links = report.links.expect("links probed");
        assert_eq!(links.checked, 2);
        assert_eq!(links.failures.len(), 1);
        assert_eq!(links.failures[0].to_string(), "https://dead.example -> 404");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn live_links_pass_against_mock_server() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (dir, options) = write_document(&document(vec![
            resource("a", "Alpha", &format!("{}/a", server.uri()), "First."),
            resource("b", "Beta", &format!("{}/b", server.uri()), "Second."),
        ]));

        let report = run_validation(&options, Arc::new(NoopObserver)).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.links.map(|l| l.checked), Some(2));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn empty_document_is_success() {
        let (dir, options) = write_document(&Document::default());
        let report = run_validation(&options, Arc::new(NoopObserver)).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.resources, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_content_file_is_an_error() {
        let mut options = ValidateOptions::from(&AppConfig::default());
        options.resources_path = std::env::temp_dir()
            .join(format!("roadmap-validate-missing-{}", Uuid::now_v7()))
            .join("resources.yaml");

        let result = run_validation(&options, Arc::new(NoopObserver)).await;
        assert!(matches!(result, Err(RoadmapError::Io { .. })));
    }
}
