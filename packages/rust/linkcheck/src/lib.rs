//! Link liveness probing.
//!
//! This crate provides:
//! - [`probe`] - the [`Probe`] seam and the HTTP implementation ([`HttpProber`])
//! - [`engine`] - a fixed pool of workers draining a shared list of URLs

pub mod engine;
pub mod probe;

use std::time::Duration;

use roadmap_shared::ValidateConfig;

pub use engine::{LinkCheckReport, NoopObserver, ProbeFailure, ProbeObserver, check_links};
pub use probe::{HttpProber, Probe, ProbeOutcome};

/// Runtime link-check configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct LinkCheckConfig {
    /// Number of concurrent workers.
    pub concurrency: usize,
    /// Timeout applied to each HEAD and each GET.
    pub timeout: Duration,
    /// Pause after each probe, per worker.
    pub delay: Duration,
    /// Pause between a rejected HEAD and the fallback GET.
    pub fallback_delay: Duration,
}

impl From<&ValidateConfig> for LinkCheckConfig {
    fn from(config: &ValidateConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: Duration::from_secs(config.timeout_secs),
            delay: Duration::from_millis(config.delay_ms),
            fallback_delay: Duration::from_millis(config.fallback_delay_ms),
        }
    }
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self::from(&ValidateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_validate_section() {
        let config = LinkCheckConfig::default();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.delay, Duration::from_millis(50));
        assert_eq!(config.fallback_delay, Duration::from_millis(250));
    }
}
