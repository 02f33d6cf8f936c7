//! Scan engine: bounded concurrent fetch + extract over a candidate list.
//!
//! Every candidate becomes a task in a [`JoinSet`]; a semaphore bounds how
//! many of them talk to the network at once. The engine consumes results in
//! completion order, aggregating successes into the scan report and the
//! shared [`PartialFindings`] buffer, and pauses a random politeness interval
//! after each consumed result.
//!
//! # Shutdown
//!
//! The [`ShutdownSignal`] is checked before every completed result is
//! processed. Once it is set:
//! - nothing else is aggregated
//! - the semaphore is closed, so tasks that never started exit without a request
//! - in-flight tasks get the configured grace period, then are aborted
//!
//! Results produced during the grace period are discarded.
//!
//! # Example
//!
//! ```no_run
//! use profile_finder_core::scan::{NoProgress, ScanEngine, ScanOptions};
//! use profile_finder_core::{
//!     DomainRegistry, FetchConfig, Fetcher, PartialFindings, ScanMode, ShutdownSignal,
//!     build_candidates,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(FetchConfig::default())?;
//! let engine = ScanEngine::new(6, fetcher, ScanOptions::default())?;
//! let candidates = build_candidates(["alice"], ScanMode::Username, &DomainRegistry::builtin());
//! let report = engine
//!     .run(candidates, &PartialFindings::new(), &ShutdownSignal::new(), &NoProgress)
//!     .await;
//! println!("found {} of {}", report.found, report.total);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::progress::ScanProgress;
use super::{Candidate, ScanError, ShutdownSignal};
use crate::extract::extract_profile;
use crate::fetch::Fetcher;
use crate::finding::{Finding, PartialFindings};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Default lower bound of the politeness pause.
const DEFAULT_THROTTLE_MIN: Duration = Duration::from_millis(1000);

/// Default upper bound of the politeness pause.
const DEFAULT_THROTTLE_MAX: Duration = Duration::from_millis(2500);

/// Default time in-flight tasks get to finish after shutdown.
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Tunables for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lower bound of the pause after each consumed result.
    pub throttle_min: Duration,
    /// Upper bound of the pause after each consumed result.
    pub throttle_max: Duration,
    /// How long in-flight tasks may run after shutdown before being aborted.
    pub grace_period: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            throttle_min: DEFAULT_THROTTLE_MIN,
            throttle_max: DEFAULT_THROTTLE_MAX,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

impl ScanOptions {
    /// Options with no politeness pause, for tests and local targets.
    #[must_use]
    pub fn without_throttle() -> Self {
        Self {
            throttle_min: Duration::ZERO,
            throttle_max: Duration::ZERO,
            ..Self::default()
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn throttle_delay(&self) -> Duration {
        let min_ms = self.throttle_min.as_millis() as u64;
        let max_ms = (self.throttle_max.as_millis() as u64).max(min_ms);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}

/// Outcome of one scan run.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Aggregated findings in completion order.
    pub findings: Vec<Finding>,
    /// Number of aggregated findings.
    pub found: usize,
    /// Number of consumed candidates that produced nothing.
    pub skipped: usize,
    /// Number of candidates submitted.
    pub total: usize,
    /// True if the run stopped because shutdown was requested.
    pub interrupted: bool,
}

/// Runs candidate batches with bounded concurrency.
#[derive(Debug, Clone)]
pub struct ScanEngine {
    fetcher: Fetcher,
    concurrency: usize,
    options: ScanOptions,
}

impl ScanEngine {
    /// Creates a scan engine.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConcurrency`] if `concurrency` is outside
    /// 1-100.
    #[instrument(level = "debug", skip(fetcher, options))]
    pub fn new(
        concurrency: usize,
        fetcher: Fetcher,
        options: ScanOptions,
    ) -> Result<Self, ScanError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ScanError::InvalidConcurrency { value: concurrency });
        }

        debug!(
            concurrency,
            max_attempts = fetcher.config().retry_policy.max_attempts(),
            throttle_min_ms = options.throttle_min.as_millis(),
            throttle_max_ms = options.throttle_max.as_millis(),
            "creating scan engine"
        );

        Ok(Self {
            fetcher,
            concurrency,
            options,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches and extracts every candidate, consuming results as they complete.
    ///
    /// Individual candidate failures never fail the run; they are counted as
    /// skipped.
    #[instrument(skip_all, fields(total = candidates.len(), concurrency = self.concurrency))]
    pub async fn run(
        &self,
        candidates: Vec<Candidate>,
        partial: &PartialFindings,
        shutdown: &ShutdownSignal,
        progress: &dyn ScanProgress,
    ) -> ScanReport {
        let total = candidates.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        info!("starting scan");
        progress.on_start(total);

        for candidate in candidates {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = self.fetcher.clone();
            tasks.spawn(async move {
                // Closed semaphore means shutdown; never start the request.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                scan_candidate(&fetcher, &candidate).await
            });
        }

        let mut report = ScanReport {
            total,
            ..ScanReport::default()
        };

        loop {
            if shutdown.is_requested() {
                report.interrupted = true;
                break;
            }

            let joined = tokio::select! {
                biased;
                () = shutdown.notified() => {
                    report.interrupted = true;
                    break;
                }
                joined = tasks.join_next() => joined,
            };
            let Some(joined) = joined else {
                break;
            };

            if shutdown.is_requested() {
                report.interrupted = true;
                break;
            }

            match joined {
                Ok(Some(finding)) => {
                    partial.push(finding.clone());
                    report.findings.push(finding);
                    report.found = report.findings.len();
                    if let Some(finding) = report.findings.last() {
                        progress.on_found(report.found, total, finding);
                    }
                }
                Ok(None) => {
                    report.skipped += 1;
                    progress.on_skipped(report.skipped);
                }
                Err(e) => {
                    warn!(error = %e, "scan task panicked");
                    report.skipped += 1;
                    progress.on_skipped(report.skipped);
                }
            }

            let delay = self.options.throttle_delay();
            if !delay.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = shutdown.notified() => {}
                }
            }
        }

        if report.interrupted {
            semaphore.close();
            let remaining = tasks.len();
            if remaining > 0 {
                debug!(
                    remaining,
                    grace_ms = self.options.grace_period.as_millis(),
                    "waiting for in-flight tasks"
                );
                let drained = tokio::time::timeout(self.options.grace_period, async {
                    while tasks.join_next().await.is_some() {}
                })
                .await;
                if drained.is_err() {
                    warn!(remaining = tasks.len(), "aborting in-flight tasks");
                    tasks.abort_all();
                }
            }
        }

        progress.on_finish(report.found, report.skipped, report.interrupted);
        info!(
            found = report.found,
            skipped = report.skipped,
            total,
            interrupted = report.interrupted,
            "scan complete"
        );
        report
    }
}

/// Fetches one candidate and turns its body into a finding.
async fn scan_candidate(fetcher: &Fetcher, candidate: &Candidate) -> Option<Finding> {
    let page = fetcher.fetch(&candidate.url).await?;
    match extract_profile(&candidate.platform, &candidate.url, &page.body) {
        Ok(finding) => Some(finding),
        Err(e) => {
            warn!(url = %candidate.url, error = %e, "extraction failed");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::scan::NoProgress;

    fn fetcher() -> Fetcher {
        Fetcher::new(FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_rejects_zero_concurrency() {
        let result = ScanEngine::new(0, fetcher(), ScanOptions::default());
        assert!(matches!(
            result,
            Err(ScanError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_engine_rejects_too_much_concurrency() {
        assert!(ScanEngine::new(101, fetcher(), ScanOptions::default()).is_err());
        assert_eq!(
            ScanEngine::new(100, fetcher(), ScanOptions::default())
                .unwrap()
                .concurrency(),
            100
        );
    }

    #[test]
    fn test_default_throttle_bounds() {
        let options = ScanOptions::default();
        for _ in 0..100 {
            let delay = options.throttle_delay();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_without_throttle_is_zero() {
        assert_eq!(ScanOptions::without_throttle().throttle_delay(), Duration::ZERO);
    }

    #[test]
    fn test_inverted_throttle_range_uses_minimum() {
        let options = ScanOptions {
            throttle_min: Duration::from_millis(30),
            throttle_max: Duration::from_millis(10),
            ..ScanOptions::default()
        };
        assert_eq!(options.throttle_delay(), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let engine = ScanEngine::new(2, fetcher(), ScanOptions::without_throttle()).unwrap();
        let report = engine
            .run(
                Vec::new(),
                &PartialFindings::new(),
                &ShutdownSignal::new(),
                &NoProgress,
            )
            .await;
        assert_eq!(report.total, 0);
        assert_eq!(report.found, 0);
        assert!(!report.interrupted);
    }

    #[tokio::test]
    async fn test_shutdown_before_run_aggregates_nothing() {
        let options = ScanOptions {
            grace_period: Duration::from_millis(100),
            ..ScanOptions::without_throttle()
        };
        let engine = ScanEngine::new(2, fetcher(), options).unwrap();
        let shutdown = ShutdownSignal::new();
        shutdown.request();
        let partial = PartialFindings::new();
        let candidates = vec![
            Candidate::new("GitHub", "http://127.0.0.1:9/alice"),
            Candidate::new("GitLab", "http://127.0.0.1:9/alice"),
        ];

        let report = engine
            .run(candidates, &partial, &shutdown, &NoProgress)
            .await;

        assert!(report.interrupted);
        assert!(report.findings.is_empty());
        assert_eq!(report.total, 2);
        assert!(partial.is_empty());
    }
}
