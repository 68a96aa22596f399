//! Single-URL liveness probe with a HEAD → GET fallback.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use roadmap_shared::{Result, RoadmapError};
use serde::Serialize;
use tracing::debug;

use crate::LinkCheckConfig;

/// User-Agent string for probe requests.
const USER_AGENT: &str = concat!("chess-roadmap-validate/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

// ---------------------------------------------------------------------------
// ProbeOutcome
// ---------------------------------------------------------------------------

/// Final observation for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The last request completed with this status code.
    Status(u16),
    /// The last request failed (network error, timeout, invalid URL).
    Error(String),
}

impl ProbeOutcome {
    /// Alive means a final status in `[200, 400)`.
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Status(code) if is_acceptable(*code))
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

fn is_acceptable(code: u16) -> bool {
    (200..400).contains(&code)
}

// ---------------------------------------------------------------------------
// Probe trait
// ---------------------------------------------------------------------------

/// Checks whether a URL is reachable.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

// ---------------------------------------------------------------------------
// HttpProber
// ---------------------------------------------------------------------------

/// Probes over HTTP: `HEAD` first, then one `GET` if the `HEAD` was not accepted.
pub struct HttpProber {
    client: Client,
    timeout: Duration,
    fallback_delay: Duration,
}

impl HttpProber {
    pub fn new(config: &LinkCheckConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| RoadmapError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: config.timeout,
            fallback_delay: config.fallback_delay,
        })
    }
}

impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) if is_acceptable(response.status().as_u16()) => {
                return ProbeOutcome::Status(response.status().as_u16());
            }
            Ok(response) => {
                debug!(url, status = response.status().as_u16(), "HEAD rejected, retrying with GET");
            }
            Err(e) => {
                debug!(url, error = %e, "HEAD failed, retrying with GET");
            }
        }

        if !self.fallback_delay.is_zero() {
            tokio::time::sleep(self.fallback_delay).await;
        }

        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) => ProbeOutcome::Error(describe_error(&e, self.timeout)),
        }
    }
}

/// Short, report-friendly description of a request error.
fn describe_error(error: &reqwest::Error, timeout: Duration) -> String {
    if error.is_timeout() {
        format!("timed out after {}ms", timeout.as_millis())
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else if error.is_builder() {
        format!("invalid URL: {error}")
    } else {
        error.to_string()
    }
}
