//! Pipeline stages for PDF black-and-white / grayscale conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ range ──▶ render ──▶ transform ──▶ assemble
//! (path)   (indices)  (pdfium)  (1-bit/JPEG)   (lopdf)
//! ```
//!
//! 1. [`input`]     — validate the caller-supplied path (exists, readable,
//!    `%PDF` magic)
//! 2. [`range`]     — parse the page-range expression against the document's
//!    page count
//! 3. [`render`]    — rasterise each selected page at the configured DPI
//! 4. [`transform`] — threshold to a bi-level stream or re-encode as
//!    grayscale JPEG
//! 5. [`assemble`]  — rebuild a single PDF with one image per page

pub mod assemble;
pub mod input;
pub mod range;
pub mod render;
pub mod transform;
