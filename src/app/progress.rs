//! Console reporting of scan progress.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use profile_finder_core::{Finding, ScanProgress};

/// Prints each finding as `[n/total] platform | username | url` and, on an
/// interactive terminal, keeps a progress bar on stderr.
pub(crate) struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub(crate) fn new(use_progress_bar: bool) -> Self {
        Self {
            bar: use_progress_bar.then(ProgressBar::hidden),
        }
    }

    fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

pub(crate) fn format_found_line(found: usize, total: usize, finding: &Finding) -> String {
    format!(
        "[{found}/{total}] {} | {} | {}",
        finding.platform, finding.username, finding.url
    )
}

impl ScanProgress for ConsoleProgress {
    fn on_start(&self, total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_bar} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            bar.enable_steady_tick(Duration::from_millis(120));
        }
    }

    fn on_found(&self, found: usize, total: usize, finding: &Finding) {
        self.println(&format_found_line(found, total, finding));
        if let Some(bar) = &self.bar {
            bar.inc(1);
            bar.set_message(format!("{found} found"));
        }
    }

    fn on_skipped(&self, _skipped: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_finish(&self, found: usize, skipped: usize, interrupted: bool) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
        let suffix = if interrupted { " (interrupted)" } else { "" };
        println!("[i] Scan finished: {found} found, {skipped} skipped{suffix}");
    }
}
