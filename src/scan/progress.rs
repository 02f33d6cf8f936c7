//! Progress reporting hook for scans.

use crate::finding::Finding;

/// Receives scan events from the consuming loop.
///
/// Callbacks run on the orchestrating task, one at a time, in completion
/// order. All methods default to doing nothing.
pub trait ScanProgress: Send + Sync {
    /// Called once before any result is consumed.
    fn on_start(&self, _total: usize) {}

    /// Called after a finding has been aggregated.
    ///
    /// `found` counts aggregated findings including this one.
    fn on_found(&self, _found: usize, _total: usize, _finding: &Finding) {}

    /// Called after a candidate produced nothing.
    fn on_skipped(&self, _skipped: usize) {}

    /// Called once when the loop stops, normally or on shutdown.
    fn on_finish(&self, _found: usize, _skipped: usize, _interrupted: bool) {}
}

/// Progress sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ScanProgress for NoProgress {}
