//! # pdfmono
//!
//! Convert PDF documents to black-and-white or grayscale image PDFs.
//!
//! ## Why this crate?
//!
//! Scanned and office PDFs are routinely archived or printed in monochrome.
//! Doing that well is more than flipping a printer switch: each page must be
//! rasterised at a controlled DPI, thresholded or requantised, re-encoded
//! compactly (lossless bi-level for text, JPEG for grayscale), and rebuilt
//! into a valid PDF, across whole folders of files with per-file results
//! you can audit afterwards.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs
//!  │
//!  ├─ 1. Input      validate path and %PDF magic
//!  ├─ 2. Range      parse "1-5,8" into page indices
//!  ├─ 3. Render     rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Transform  threshold → 1-bit, or grayscale → JPEG
//!  ├─ 5. Assemble   rebuild one PDF per input (lopdf)
//!  └─ 6. History    per-file results, exportable as text / CSV
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmono::{BatchController, ColorMode, ConversionConfig, ExportFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .mode(ColorMode::BlackWhite)
//!         .threshold(180)
//!         .dpi(300)
//!         .build()?;
//!
//!     let history = BatchController::new(config)
//!         .run(vec!["scan1.pdf".into(), "scan2.pdf".into()])
//!         .await?;
//!
//!     print!("{}", history.export(ExportFormat::Text));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfmono` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfmono = { version = "0.3", default-features = false }
//! ```
//!
//! ## Error model
//!
//! A bad page never kills a document and a bad document never kills a batch:
//! page failures are recorded in [`PageResult`], job failures in
//! [`JobResult`], and the batch always returns the full [`BatchHistory`].
//! Only an invalid [`ConversionConfig`] aborts a batch before it starts.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod history;
pub mod job;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::BatchController;
pub use config::{ColorMode, ConversionConfig, ConversionConfigBuilder, OverwritePolicy};
pub use error::{PageError, PdfMonoError};
pub use history::{BatchHistory, ExportFormat, JobResult, JobStatus, PageResult};
pub use pipeline::render::{DocumentOpener, PageSource, PdfiumOpener};
pub use progress::{BatchProgressCallback, NoopProgressCallback};
