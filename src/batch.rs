//! Batch controller: run a sequence of conversion jobs to completion.
//!
//! ## Why sequential?
//!
//! Jobs run one at a time, pages within a job one at a time. That bounds
//! memory to a single document's rasterised pages, keeps progress reporting
//! strictly ordered and deterministic, and means [`BatchHistory`] has exactly
//! one writer. The CPU cost of rendering dominates anyway; parallel jobs
//! would mostly buy memory pressure.
//!
//! ## Why spawn_blocking?
//!
//! pdfium and the pixel work are CPU-bound and not async-safe. The async
//! [`BatchController::run`] moves the whole batch onto a dedicated blocking
//! thread so a caller's responsiveness-sensitive executor (or UI thread)
//! never stalls; communication happens through the progress callback and the
//! shared cancellation flag. Callers without a runtime use
//! [`BatchController::run_sync`].

use crate::config::ConversionConfig;
use crate::error::PdfMonoError;
use crate::history::{BatchHistory, JobStatus};
use crate::job::{run_job, JobContext};
use crate::pipeline::render::{DocumentOpener, PdfiumOpener};
use crate::progress::{BatchProgressCallback, NoopProgressCallback};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Runs [`ConversionJob`](crate::job)s over a set of input files, sharing one
/// [`ConversionConfig`], aggregating results into a [`BatchHistory`].
///
/// # Example
/// ```rust,no_run
/// use pdfmono::{BatchController, ConversionConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder().dpi(200).build()?;
/// let history = BatchController::new(config)
///     .run_sync(vec!["a.pdf".into(), "b.pdf".into()])?;
/// println!("{}", history.export(pdfmono::ExportFormat::Text));
/// # Ok(())
/// # }
/// ```
pub struct BatchController {
    config: Arc<ConversionConfig>,
    progress: Arc<dyn BatchProgressCallback>,
    opener: Arc<dyn DocumentOpener>,
    cancel: Arc<AtomicBool>,
}

impl BatchController {
    /// Create a controller with the default pdfium backend and no progress
    /// reporting.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config: Arc::new(config),
            progress: Arc::new(NoopProgressCallback),
            opener: Arc::new(PdfiumOpener),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a progress callback. It receives an event after every page and
    /// every job, and is consulted for `Ask` overwrite decisions.
    pub fn with_progress(mut self, progress: Arc<dyn BatchProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Replace the document backend. Used by tests to inject scripted
    /// documents; production callers keep the default pdfium opener.
    pub fn with_opener(mut self, opener: Arc<dyn DocumentOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Shared cancellation flag. Setting it to `true` stops the batch at the
    /// next page or job boundary; the in-flight job ends as `Failed` with a
    /// cancellation reason and the partial history is returned.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Process `inputs` strictly in order on a blocking thread.
    ///
    /// Returns `Err` only for a pre-flight [`PdfMonoError::InvalidConfig`];
    /// every per-file problem is recorded in the history instead.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<BatchHistory, PdfMonoError> {
        let config = Arc::clone(&self.config);
        let progress = Arc::clone(&self.progress);
        let opener = Arc::clone(&self.opener);
        let cancel = Arc::clone(&self.cancel);

        tokio::task::spawn_blocking(move || {
            run_batch(&config, &*progress, &*opener, &cancel, &inputs)
        })
        .await
        .map_err(|e| PdfMonoError::Internal(format!("batch task panicked: {e}")))?
    }

    /// Blocking form of [`run`](Self::run) for callers without a runtime.
    pub fn run_sync(&self, inputs: Vec<PathBuf>) -> Result<BatchHistory, PdfMonoError> {
        run_batch(
            &self.config,
            &*self.progress,
            &*self.opener,
            &self.cancel,
            &inputs,
        )
    }
}

fn run_batch(
    config: &ConversionConfig,
    progress: &dyn BatchProgressCallback,
    opener: &dyn DocumentOpener,
    cancel: &AtomicBool,
    inputs: &[PathBuf],
) -> Result<BatchHistory, PdfMonoError> {
    // Pre-flight: the only error that aborts a batch outright.
    config.validate()?;

    let files_total = inputs.len();
    let mut history = BatchHistory::new();

    info!("Starting batch of {} files", files_total);
    progress.on_batch_start(files_total);

    for (files_completed, input) in inputs.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            warn!("Batch cancelled before {}", input.display());
            break;
        }

        let ctx = JobContext {
            progress,
            cancel,
            files_completed,
            files_total,
        };
        let result = run_job(input, config, opener, &ctx);
        progress.on_job_complete(files_completed + 1, files_total, &result);
        history.push(result);

        if cancel.load(Ordering::Relaxed) {
            warn!("Batch cancelled after {} files", history.len());
            break;
        }
    }

    let success_count = history.count(JobStatus::Success);
    info!(
        "Batch complete: {}/{} files succeeded",
        success_count,
        history.len()
    );
    progress.on_batch_complete(files_total, success_count);

    Ok(history)
}
