//! Bounded-concurrency link checker.
//!
//! A fixed list of URLs is shared by `concurrency` worker tasks. Each worker
//! claims the next index from an atomic cursor until the list is exhausted, so
//! every URL is probed exactly once and never by two workers.
//!
//! A URL whose probe never completed (its worker panicked, or every worker
//! died before reaching it) is reported as a failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::LinkCheckConfig;
use crate::probe::{Probe, ProbeOutcome};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// A URL whose final outcome was not alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.url, self.outcome)
    }
}

/// Summary of a completed link check.
#[derive(Debug, Clone, Serialize)]
pub struct LinkCheckReport {
    /// Number of URLs probed.
    pub checked: usize,
    /// Failures, in input order.
    pub failures: Vec<ProbeFailure>,
    /// Wall-clock duration of the check.
    #[serde(skip)]
    pub duration: Duration,
}

impl LinkCheckReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Receives a callback as each URL finishes. Called from worker tasks.
pub trait ProbeObserver: Send + Sync {
    fn probed(&self, _url: &str, _outcome: &ProbeOutcome, _done: usize, _total: usize) {}
}

/// Observer that ignores all events.
pub struct NoopObserver;

impl ProbeObserver for NoopObserver {}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Probe every URL in `urls` with at most `config.concurrency` in flight.
#[instrument(skip_all, fields(urls = urls.len(), concurrency = config.concurrency))]
pub async fn check_links<P: Probe>(
    probe: Arc<P>,
    urls: Vec<String>,
    config: &LinkCheckConfig,
    observer: Arc<dyn ProbeObserver>,
) -> LinkCheckReport {
    let start = Instant::now();
    let total = urls.len();

    if total == 0 {
        return LinkCheckReport {
            checked: 0,
            failures: Vec::new(),
            duration: start.elapsed(),
        };
    }

    let items: Arc<[String]> = urls.into();
    let cursor = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));
    let finished: Arc<[AtomicBool]> = (0..total).map(|_| AtomicBool::new(false)).collect();
    let failures = Arc::new(Mutex::new(Vec::<(usize, ProbeFailure)>::new()));
    let workers = config.concurrency.clamp(1, total);

    info!(
        workers,
        delay_ms = config.delay.as_millis() as u64,
        "starting link check"
    );

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let probe = probe.clone();
        let items = items.clone();
        let cursor = cursor.clone();
        let done = done.clone();
        let finished = finished.clone();
        let failures = failures.clone();
        let observer = observer.clone();
        let delay = config.delay;

        handles.push(tokio::spawn(async move {
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(url) = items.get(index) else {
                    break;
                };

                let outcome = probe.probe(url).await;
                let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
                observer.probed(url, &outcome, completed, total);

                if !outcome.is_alive() {
                    failures.lock().await.push((
                        index,
                        ProbeFailure {
                            url: url.clone(),
                            outcome,
                        },
                    ));
                }
                finished[index].store(true, Ordering::SeqCst);

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "link check worker terminated abnormally");
        }
    }

    let mut collected = std::mem::take(&mut *failures.lock().await);
    for (index, _) in finished
        .iter()
        .enumerate()
        .filter(|(_, flag)| !flag.load(Ordering::SeqCst))
    {
        warn!(url = %items[index], "probe did not complete");
        collected.push((
            index,
            ProbeFailure {
                url: items[index].clone(),
                outcome: ProbeOutcome::Error("probe task terminated before completing".into()),
            },
        ));
    }
    collected.sort_by_key(|(index, _)| *index);

    let report = LinkCheckReport {
        checked: done.load(Ordering::SeqCst),
        failures: collected.into_iter().map(|(_, failure)| failure).collect(),
        duration: start.elapsed(),
    };

    info!(
        checked = report.checked,
        failures = report.failures.len(),
        duration_ms = report.duration.as_millis() as u64,
        "link check completed"
    );

    report
}
