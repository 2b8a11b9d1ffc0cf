//! Progress reporting for long-running tessellations
//!
//! Reporting is push-only: the tessellator calls [`ProgressReporter::report`]
//! at fixed batch boundaries and never waits on the reporter. The same
//! boundaries are where [`ProgressReporter::is_cancelled`] is consulted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver of fractional completion values in [0, 1]
pub trait ProgressReporter {
    /// Called with non-decreasing fractions
    fn report(&mut self, fraction: f64);

    /// Return `true` to stop the run at the next batch boundary
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: FnMut(f64)> ProgressReporter for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Reporter that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _fraction: f64) {}
}

/// Wraps a reporter with a shared cancellation flag
///
/// # Example
///
/// ```rust
/// use sphere_tessellator::{Cancellable, ProgressReporter};
///
/// let mut reporter = Cancellable::new(|_fraction: f64| {});
/// let handle = reporter.handle();
/// assert!(!reporter.is_cancelled());
/// handle.store(true, std::sync::atomic::Ordering::Relaxed);
/// assert!(reporter.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct Cancellable<P> {
    inner: P,
    cancelled: Arc<AtomicBool>,
}

impl<P: ProgressReporter> Cancellable<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that cancels the run once set, from any thread
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl<P: ProgressReporter> ProgressReporter for Cancellable<P> {
    fn report(&mut self, fraction: f64) {
        self.inner.report(fraction);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.inner.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        {
            let mut reporter = |f: f64| seen.push(f);
            reporter.report(0.25);
            reporter.report(0.5);
            assert!(!reporter.is_cancelled());
        }
        assert_eq!(seen, vec![0.25, 0.5]);
    }

    #[test]
    fn test_cancellable_forwards_reports() {
        let mut count = 0;
        {
            let mut reporter = Cancellable::new(|_: f64| count += 1);
            reporter.report(0.1);
            reporter.handle().store(true, Ordering::Relaxed);
            assert!(reporter.is_cancelled());
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_no_progress() {
        let mut reporter = NoProgress;
        reporter.report(1.0);
        assert!(!reporter.is_cancelled());
    }
}
