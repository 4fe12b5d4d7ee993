//! Progress and completion reporting.
//!
//! The pipeline takes an observer explicitly instead of calling ambient hooks.
//! `on_progress` fires once per classified marker with `processed` running from
//! 1 to `total`; `on_complete` fires exactly once with the final result.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::filter::FilteredResult;

/// Trait for receiving pipeline updates.
pub trait LandmarkObserver: Send + Sync {
    /// Called after each marker is classified, matched or not.
    fn on_progress(&self, processed: u32, total: u32);
    /// Called once, after filtering, with the final landmarks.
    fn on_complete(&self, result: &FilteredResult);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl LandmarkObserver for NoopObserver {
    fn on_progress(&self, _processed: u32, _total: u32) {}
    fn on_complete(&self, _result: &FilteredResult) {}
}

/// Adapts a pair of closures into an observer.
pub struct FnObserver<P, C>
where
    P: Fn(u32, u32) + Send + Sync,
    C: Fn(&FilteredResult) + Send + Sync,
{
    on_progress: P,
    on_complete: C,
}

impl<P, C> FnObserver<P, C>
where
    P: Fn(u32, u32) + Send + Sync,
    C: Fn(&FilteredResult) + Send + Sync,
{
    pub fn new(on_progress: P, on_complete: C) -> Self {
        Self { on_progress, on_complete }
    }
}

impl<P, C> LandmarkObserver for FnObserver<P, C>
where
    P: Fn(u32, u32) + Send + Sync,
    C: Fn(&FilteredResult) + Send + Sync,
{
    fn on_progress(&self, processed: u32, total: u32) {
        (self.on_progress)(processed, total)
    }

    fn on_complete(&self, result: &FilteredResult) {
        (self.on_complete)(result)
    }
}

/// Thread-safe recorder that can be polled from another thread.
/// Useful for testing and as a reference implementation.
#[derive(Default)]
pub struct ProgressRecorder {
    pub processed: AtomicU32,
    pub total: AtomicU32,
    pub completions: AtomicU32,
    history: Mutex<Vec<(u32, u32)>>,
    result: Mutex<Option<FilteredResult>>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of markers classified so far (0.0 before the first update).
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 0.0;
        }
        self.processed.load(Ordering::SeqCst) as f64 / total as f64
    }

    /// Every `(processed, total)` pair received, in order.
    pub fn history(&self) -> Vec<(u32, u32)> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// The delivered result, if completion has fired.
    pub fn result(&self) -> Option<FilteredResult> {
        self.result.lock().ok().and_then(|r| r.clone())
    }
}

impl LandmarkObserver for ProgressRecorder {
    fn on_progress(&self, processed: u32, total: u32) {
        self.processed.store(processed, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        if let Ok(mut history) = self.history.lock() {
            history.push((processed, total));
        }
    }

    fn on_complete(&self, result: &FilteredResult) {
        self.completions.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.result.lock() {
            *slot = Some(result.clone());
        }
    }
}
