//! Progress reporting for long-running extraction runs.
//!
//! Front ends implement [`ProgressObserver`] to drive a progress bar or
//! status line. Closures `FnMut(usize, usize)` work as observers directly.

use crate::error::UrlError;

/// Receives run progress.
///
/// Called synchronously on the runner's task between URLs; a slow observer
/// delays the next fetch.
pub trait ProgressObserver {
    /// One URL finished. `processed` counts from 1 to `total`.
    fn on_progress(&mut self, processed: usize, total: usize);

    /// A URL failed and the run continues (isolating policy only).
    fn on_failure(&mut self, _index: usize, _url: &str, _error: &UrlError) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// A no-op observer.
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

/// Records every notification; handy in tests and for summaries.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub updates: Vec<(usize, usize)>,
    pub failures: Vec<(usize, String)>,
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        self.updates.push((processed, total));
    }

    fn on_failure(&mut self, index: usize, url: &str, _error: &UrlError) {
        self.failures.push((index, url.to_string()));
    }
}
