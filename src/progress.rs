//! Progress-callback trait for batch conversion events.
//!
//! Inject an `Arc<dyn BatchProgressCallback>` via
//! [`crate::batch::BatchController::with_progress`] to receive events as the
//! controller works through files and pages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a database record, or a terminal progress bar
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` because the batch typically runs
//! on a background thread while the caller's UI thread stays responsive.
//!
//! The overwrite prompt lives on the same trait: when the overwrite policy is
//! `Ask`, the controller calls [`BatchProgressCallback::confirm_overwrite`]
//! and treats a `false` answer as skip. The default implementation declines,
//! so an unattended batch never silently replaces files.

use crate::history::JobResult;
use std::path::Path;

/// Called by the batch controller as it processes files and pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Jobs and pages are strictly sequential, so no two
/// callback invocations ever overlap.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first job starts.
    fn on_batch_start(&self, files_total: usize) {
        let _ = files_total;
    }

    /// Called when a job begins rendering, after its page range is resolved.
    ///
    /// `pages_total` is the number of *selected* pages, not the document's
    /// full page count.
    fn on_job_start(
        &self,
        files_completed: usize,
        files_total: usize,
        pages_total: usize,
        file_name: &str,
    ) {
        let _ = (files_completed, files_total, pages_total, file_name);
    }

    /// Called after each page attempt, successful or not.
    ///
    /// Counts are cumulative within the batch (`files_completed`) and within
    /// the current file (`pages_completed` out of `pages_total`).
    fn on_page_complete(
        &self,
        files_completed: usize,
        files_total: usize,
        pages_completed: usize,
        pages_total: usize,
        file_name: &str,
    ) {
        let _ = (
            files_completed,
            files_total,
            pages_completed,
            pages_total,
            file_name,
        );
    }

    /// Called when a page fails, immediately before `on_page_complete`.
    fn on_page_error(&self, page_num: usize, pages_total: usize, error: &str) {
        let _ = (page_num, pages_total, error);
    }

    /// Called when a job reaches a terminal status.
    fn on_job_complete(&self, files_completed: usize, files_total: usize, result: &JobResult) {
        let _ = (files_completed, files_total, result);
    }

    /// Called once after the last job, or after cancellation.
    fn on_batch_complete(&self, files_total: usize, success_count: usize) {
        let _ = (files_total, success_count);
    }

    /// Decide whether an existing output file may be replaced.
    ///
    /// Only consulted when the overwrite policy is
    /// [`OverwritePolicy::Ask`](crate::config::OverwritePolicy::Ask).
    /// Returning `false` skips the job.
    fn confirm_overwrite(&self, path: &Path) -> bool {
        let _ = path;
        false
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TrackingCallback {
        pages: AtomicUsize,
        jobs: AtomicUsize,
        errors: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _: usize, _: usize, _: usize, _: usize, _: &str) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _pages_total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_job_complete(&self, _: usize, _: usize, _result: &JobResult) {
            self.jobs.fetch_add(1, Ordering::SeqCst);
        }

        fn confirm_overwrite(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(3);
        cb.on_job_start(0, 3, 10, "a.pdf");
        cb.on_page_complete(0, 3, 1, 10, "a.pdf");
        cb.on_page_error(2, 10, "render failed");
        cb.on_batch_complete(3, 2);
        assert!(!cb.confirm_overwrite(Path::new("/tmp/out.pdf")));
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback {
            pages: AtomicUsize::new(0),
            jobs: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };
        cb.on_page_complete(0, 1, 1, 2, "a.pdf");
        cb.on_page_error(2, 2, "boom");
        cb.on_page_complete(0, 1, 2, 2, "a.pdf");
        assert_eq!(cb.pages.load(Ordering::SeqCst), 2);
        assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
        assert!(cb.confirm_overwrite(Path::new("x.pdf")));
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_page_complete(0, 1, 1, 1, "a.pdf");
    }
}
