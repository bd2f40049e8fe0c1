//! One conversion job: a single input file driven through the pipeline.
//!
//! A job moves through a fixed sequence of phases (validate and open the
//! document, resolve the page range, resolve the output path and apply the
//! overwrite policy, render and transform each page, assemble and write the
//! output) and always ends in exactly one terminal status: `Success`,
//! `PartialFailure`, `Failed`, or `Skipped`.
//!
//! Error containment follows the two-tier scheme from [`crate::error`]:
//! per-page failures are recorded in the result and the loop continues;
//! job-fatal failures short-circuit to `Failed` with a reason string. The
//! job never panics the batch and never returns `Err` — its outcome IS the
//! [`JobResult`].
//!
//! The open document and all intermediate pixel buffers live inside
//! [`run_job`]'s scope, so they are released when the job finishes on every
//! exit path, including cancellation.

use crate::config::{ConversionConfig, OverwritePolicy};
use crate::error::PdfMonoError;
use crate::history::{JobResult, JobStatus, PageResult};
use crate::pipeline::transform::EncodedPage;
use crate::pipeline::{assemble, input, range, render::DocumentOpener, transform};
use crate::progress::BatchProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Batch-level context a job needs to report cumulative progress and to
/// observe cancellation. Counters are "files completed before this job".
pub(crate) struct JobContext<'a> {
    pub progress: &'a dyn BatchProgressCallback,
    pub cancel: &'a AtomicBool,
    pub files_completed: usize,
    pub files_total: usize,
}

/// Run one job to completion. Infallible by design: every failure mode maps
/// to a terminal [`JobStatus`] inside the returned [`JobResult`].
pub(crate) fn run_job(
    source_path: &Path,
    config: &ConversionConfig,
    opener: &dyn DocumentOpener,
    ctx: &JobContext<'_>,
) -> JobResult {
    let started = Instant::now();
    let file_name = display_name(source_path);

    match run_job_inner(source_path, &file_name, config, opener, ctx, started) {
        Ok(result) => result,
        Err(e) => {
            warn!("Job failed for {}: {}", source_path.display(), e);
            JobResult {
                source: source_path.to_path_buf(),
                output: None,
                pages: Vec::new(),
                status: JobStatus::Failed,
                elapsed_ms: started.elapsed().as_millis() as u64,
                output_bytes: 0,
                reason: Some(e.to_string()),
            }
        }
    }
}

/// The fallible core: `Err` here means job-fatal, mapped to `Failed` above.
fn run_job_inner(
    source_path: &Path,
    file_name: &str,
    config: &ConversionConfig,
    opener: &dyn DocumentOpener,
    ctx: &JobContext<'_>,
    started: Instant,
) -> Result<JobResult, PdfMonoError> {
    // ── Phase 1: validate, open, resolve range ───────────────────────────
    input::validate_input(source_path)?;
    let mut source = opener.open(source_path)?;
    let indices = range::parse(&config.page_range, source.page_count())?;

    // ── Phase 2: resolve output path, apply overwrite policy ─────────────
    let output_path = resolve_output_path(source_path, config);
    if output_path.exists() {
        let replace = match config.overwrite {
            OverwritePolicy::Overwrite => true,
            OverwritePolicy::Skip => false,
            OverwritePolicy::Ask => ctx.progress.confirm_overwrite(&output_path),
        };
        if !replace {
            info!("Skipping {} (output exists)", source_path.display());
            return Ok(JobResult {
                source: source_path.to_path_buf(),
                output: Some(output_path),
                pages: Vec::new(),
                status: JobStatus::Skipped,
                elapsed_ms: started.elapsed().as_millis() as u64,
                output_bytes: 0,
                reason: Some("output exists".to_string()),
            });
        }
    }

    ctx.progress.on_job_start(
        ctx.files_completed,
        ctx.files_total,
        indices.len(),
        file_name,
    );

    // ── Phase 3: render + transform each selected page ───────────────────
    let mut page_results: Vec<PageResult> = Vec::with_capacity(indices.len());
    let mut survivors: Vec<EncodedPage> = Vec::with_capacity(indices.len());

    for (done, &index) in indices.iter().enumerate() {
        if ctx.cancel.load(Ordering::Relaxed) {
            return Err(PdfMonoError::Cancelled);
        }

        let outcome = source
            .render_page(index, config.dpi)
            .and_then(|image| transform::transform(&image, index, config));

        match outcome {
            Ok(encoded) => {
                survivors.push(encoded);
                page_results.push(PageResult::ok(index));
            }
            Err(e) => {
                warn!("{e}");
                ctx.progress
                    .on_page_error(index + 1, indices.len(), &e.to_string());
                page_results.push(PageResult::failed(index, e));
            }
        }

        ctx.progress.on_page_complete(
            ctx.files_completed,
            ctx.files_total,
            done + 1,
            indices.len(),
            file_name,
        );
    }

    // ── Phase 4: assemble survivors in original page order, write output ─
    let bytes = assemble::assemble(&survivors)?;
    write_output(&output_path, &bytes)?;
    let output_bytes = bytes.len() as u64;

    let failed = page_results.iter().filter(|p| !p.is_ok()).count();
    let status = if failed == 0 {
        JobStatus::Success
    } else {
        JobStatus::PartialFailure
    };

    info!(
        "Converted {} → {} ({}/{} pages, {} bytes)",
        source_path.display(),
        output_path.display(),
        page_results.len() - failed,
        page_results.len(),
        output_bytes
    );

    Ok(JobResult {
        source: source_path.to_path_buf(),
        output: Some(output_path),
        pages: page_results,
        status,
        elapsed_ms: started.elapsed().as_millis() as u64,
        output_bytes,
        reason: None,
    })
}

/// Build `{stem}{suffix}{_timestamp}?.pdf` under the configured output
/// directory (or the input's directory when unset).
pub(crate) fn resolve_output_path(source: &Path, config: &ConversionConfig) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let mut name = format!("{stem}{}", config.output_suffix);
    if config.add_timestamp {
        name.push_str(&chrono::Local::now().format("_%Y%m%d_%H%M%S").to_string());
    }
    name.push_str(".pdf");

    let dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| source.parent().unwrap_or(Path::new(".")).to_path_buf());
    dir.join(name)
}

/// Atomic write: temp file in the target directory, then rename.
fn write_output(path: &Path, bytes: &[u8]) -> Result<(), PdfMonoError> {
    let io_err = |source| PdfMonoError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    std::fs::write(&tmp_path, bytes).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    #[test]
    fn output_path_uses_suffix_and_input_dir() {
        let config = ConversionConfig::builder()
            .output_suffix("_SW")
            .build()
            .unwrap();
        let out = resolve_output_path(Path::new("/docs/report.pdf"), &config);
        assert_eq!(out, PathBuf::from("/docs/report_SW.pdf"));
    }

    #[test]
    fn output_path_honours_output_dir() {
        let config = ConversionConfig::builder()
            .output_suffix("_bw")
            .output_dir("/out")
            .build()
            .unwrap();
        let out = resolve_output_path(Path::new("/docs/a.pdf"), &config);
        assert_eq!(out, PathBuf::from("/out/a_bw.pdf"));
    }

    #[test]
    fn timestamp_is_appended_after_suffix() {
        let config = ConversionConfig::builder()
            .output_suffix("_SW")
            .add_timestamp(true)
            .build()
            .unwrap();
        let out = resolve_output_path(Path::new("scan.pdf"), &config);
        let name = out.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("scan_SW_"), "got {name}");
        assert!(name.ends_with(".pdf"));
        // _YYYYMMDD_HHMMSS adds 16 chars between suffix and extension.
        assert_eq!(name.len(), "scan_SW".len() + 16 + ".pdf".len());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"old").unwrap();
        write_output(&path, b"%PDF-new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-new");
        assert!(!path.with_extension("pdf.tmp").exists());
    }
}
