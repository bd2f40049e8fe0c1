//! Error types for the pdfmono library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfMonoError`] — **Fatal to a job**: the input cannot be opened, the
//!   page-range expression is invalid, assembly produced nothing, or the
//!   output cannot be written. The batch controller catches these, records
//!   the job as `Failed`, and moves on to the next input.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to render or
//!   transform. Stored inside [`crate::history::PageResult`] so callers can
//!   inspect partial success rather than losing the whole document to one
//!   bad page.
//!
//! Only [`PdfMonoError::InvalidConfig`] (pre-flight) and cancellation stop a
//! batch outright; everything else is downgraded at the job or page level.

use std::path::PathBuf;
use thiserror::Error;

/// All job-fatal errors produced by the pdfmono library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::history::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfMonoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Range errors ──────────────────────────────────────────────────────
    /// The page-range expression could not be applied to this document.
    #[error("Invalid page range token '{token}': {detail}")]
    InvalidPageRange { token: String, detail: String },

    // ── Assembly / output errors ──────────────────────────────────────────
    /// No pages survived rendering and transformation, or the output PDF
    /// could not be serialised.
    #[error("Failed to assemble output document: {detail}")]
    AssemblyFailed { detail: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed. Rejected before any job starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Batch control ─────────────────────────────────────────────────────
    /// The batch was cancelled while this job was in flight.
    #[error("Conversion cancelled")]
    Cancelled,

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::history::PageResult`] when a page fails. The job
/// continues with the remaining pages and ends as `PartialFailure` when at
/// least one page survived.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed (corrupt page, unsupported feature).
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Thresholding or re-encoding failed (unsupported buffer).
    #[error("Page {page}: transform failed: {detail}")]
    TransformFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } | PageError::TransformFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_display_carries_token() {
        let e = PdfMonoError::InvalidPageRange {
            token: "4-2".into(),
            detail: "start exceeds end".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'4-2'"), "got: {msg}");
    }

    #[test]
    fn page_error_display() {
        let e = PageError::RenderFailed {
            page: 3,
            detail: "bad content stream".into(),
        };
        assert!(e.to_string().contains("Page 3"));
        assert_eq!(e.page(), 3);
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = PdfMonoError::NotAPdf {
            path: "/tmp/x.pdf".into(),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("not a valid PDF"));
    }
}
