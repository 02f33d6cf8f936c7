//! Application runtime composition modules.

pub(crate) mod config_runtime;
pub(crate) mod menu;
pub(crate) mod progress;
pub(crate) mod signals;
pub(crate) mod terminal;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use profile_finder_core::report::timestamped_base;
use profile_finder_core::{
    DomainRegistry, Fetcher, Finding, InstagramClient, InstagramEndpoints, NoProgress,
    OutputFormat, PartialFindings, ReportPaths, ScanEngine, ScanMode, ScanProgress, ScanReport,
    ShutdownSignal, build_candidates, save_results,
};
use tracing::{info, warn};

use self::config_runtime::RunSettings;
use self::progress::ConsoleProgress;

/// Shared state of one process run.
pub(crate) struct App {
    pub(crate) settings: RunSettings,
    pub(crate) shutdown: ShutdownSignal,
    partial: PartialFindings,
    registry: DomainRegistry,
    quiet: bool,
    use_progress_bar: bool,
    interrupt_flushed: AtomicBool,
}

impl App {
    pub(crate) fn new(
        settings: RunSettings,
        shutdown: ShutdownSignal,
        quiet: bool,
        use_progress_bar: bool,
    ) -> Self {
        Self {
            settings,
            shutdown,
            partial: PartialFindings::new(),
            registry: DomainRegistry::builtin(),
            quiet,
            use_progress_bar,
            interrupt_flushed: AtomicBool::new(false),
        }
    }

    /// Scans `items`, saves a report if anything was found, and flushes the
    /// partial buffer if shutdown was requested meanwhile.
    pub(crate) async fn run_batch(&self, items: Vec<String>, mode: ScanMode) -> Result<()> {
        self.run_scan(items, mode, self.settings.concurrency).await?;
        self.finish_if_interrupted();
        Ok(())
    }

    /// Flushes the partial buffer once shutdown has been requested.
    ///
    /// Returns true when the caller should stop. Covers signals that land
    /// after a scan loop already finished or during a session lookup.
    pub(crate) fn finish_if_interrupted(&self) -> bool {
        if !self.shutdown.is_requested() {
            return false;
        }
        self.flush_interrupted();
        true
    }

    /// Runs one scan and writes `results_<mode>_<ts>` when it found anything.
    pub(crate) async fn run_scan(
        &self,
        items: Vec<String>,
        mode: ScanMode,
        concurrency: usize,
    ) -> Result<ScanReport> {
        let items: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        let candidates = build_candidates(&items, mode, &self.registry);
        self.say(&format!(
            "[i] Scanning {} candidate URLs for {} {mode}(s) with {concurrency} workers",
            candidates.len(),
            items.len()
        ));

        let fetcher =
            Fetcher::new(self.settings.fetch_config()).context("Failed to build HTTP client")?;
        let engine = ScanEngine::new(concurrency, fetcher, self.settings.scan_options())?;

        let console = ConsoleProgress::new(self.use_progress_bar);
        let progress: &dyn ScanProgress = if self.quiet { &NoProgress } else { &console };
        let report = engine
            .run(candidates, &self.partial, &self.shutdown, progress)
            .await;

        if report.findings.is_empty() {
            self.say("[-] No results found.");
        } else {
            let base = timestamped_base(&format!("results_{mode}"));
            self.save(&report.findings, &base, self.settings.format);
        }
        Ok(report)
    }

    /// Looks up one Instagram profile through a session file and saves it.
    ///
    /// Lookup failures are reported and swallowed.
    pub(crate) async fn run_instagram(
        &self,
        session_file: &Path,
        target: &str,
    ) -> Result<Option<Finding>> {
        let result = match InstagramClient::from_session_file(
            session_file,
            InstagramEndpoints::default(),
        ) {
            Ok(client) => client.fetch_profile(target).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(finding) => {
                let base = timestamped_base(&format!("instagram_{}", finding.username));
                self.save(std::slice::from_ref(&finding), &base, self.settings.format);
                self.say(&format!(
                    "[i] Instagram profile {} saved.",
                    finding.username
                ));
                Ok(Some(finding))
            }
            Err(e) => {
                warn!(error = %e, "instagram lookup failed");
                eprintln!("[-] Could not get Instagram data: {e}");
                Ok(None)
            }
        }
    }

    /// Writes the partial buffer as `partial_exit_<ts>` in the configured format.
    pub(crate) fn flush_on_exit(&self) -> Option<ReportPaths> {
        self.flush_partial("partial_exit", self.settings.format)
    }

    /// Writes the partial buffer as `partial_kbint_<ts>.json`.
    ///
    /// Only the first call per process writes anything.
    pub(crate) fn flush_interrupted(&self) -> Option<ReportPaths> {
        if self.interrupt_flushed.swap(true, Ordering::SeqCst) {
            return None;
        }
        let paths = self.flush_partial("partial_kbint", OutputFormat::Json);
        eprintln!("[i] Stopped by user.");
        paths
    }

    fn flush_partial(&self, prefix: &str, format: OutputFormat) -> Option<ReportPaths> {
        let findings = self.partial.snapshot();
        if findings.is_empty() {
            return None;
        }
        info!(count = findings.len(), prefix, "flushing partial findings");
        self.save(&findings, &timestamped_base(prefix), format)
    }

    fn save(&self, findings: &[Finding], base: &str, format: OutputFormat) -> Option<ReportPaths> {
        match save_results(findings, base, format, &self.settings.output_dir) {
            Ok(paths) => {
                self.say(&format!(
                    "[i] Saved {} and {}",
                    paths.data.display(),
                    paths.html.display()
                ));
                Some(paths)
            }
            Err(e) => {
                warn!(error = %e, base, "failed to save report");
                eprintln!("[!] Failed to save report: {e}");
                None
            }
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }
}
