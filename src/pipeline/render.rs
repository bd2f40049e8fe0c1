//! Page rasterisation: render PDF pages to pixel buffers via pdfium.
//!
//! ## The `PageSource` seam
//!
//! The job and batch layers never talk to pdfium directly; they go through
//! the [`PageSource`] and [`DocumentOpener`] traits. That keeps the state
//! machine testable with a scripted fake document and would let a different
//! rendering backend slot in without touching the pipeline.
//!
//! ## DPI handling
//!
//! pdfium renders to a target pixel size, so the requested DPI is converted
//! to pixels from the page's native point size: `px = points × dpi / 72`.
//! Every page is rendered at its own size, so mixed-orientation documents
//! come out correctly.

use crate::error::{PageError, PdfMonoError};
use image::DynamicImage;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// An open document that can report its page count and render single pages.
///
/// A source is owned by exactly one job and dropped when the job finishes,
/// releasing the document handle deterministically on every exit path.
pub trait PageSource {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterise one page at the given DPI.
    ///
    /// A failure here is per-page: the job records it and continues with the
    /// remaining pages.
    fn render_page(&mut self, index: usize, dpi: u32) -> Result<DynamicImage, PageError>;
}

/// Opens documents for the batch controller, one per input file.
pub trait DocumentOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, PdfMonoError>;
}

// One process-wide pdfium binding. The `thread_safe` feature serialises FFI
// calls internally, so sharing a single binding is sound. Binding failure is
// kept as a value so it surfaces as a job error instead of a panic.
static PDFIUM: Lazy<Result<Pdfium, String>> = Lazy::new(|| {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)),
        Err(_) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    };
    bindings.map(Pdfium::new).map_err(|e| e.to_string())
});

fn pdfium() -> Result<&'static Pdfium, PdfMonoError> {
    PDFIUM
        .as_ref()
        .map_err(|e| PdfMonoError::PdfiumBindingFailed(e.clone()))
}

/// The production [`DocumentOpener`]: pdfium-backed rendering.
#[derive(Debug, Default)]
pub struct PdfiumOpener;

impl DocumentOpener for PdfiumOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, PdfMonoError> {
        let document = pdfium()?.load_pdf_from_file(path, None).map_err(|e| {
            PdfMonoError::CorruptPdf {
                path: path.to_path_buf(),
                detail: format!("{e:?}"),
            }
        })?;
        let page_count = document.pages().len() as usize;
        info!("PDF loaded: {} pages ({})", page_count, path.display());
        Ok(Box::new(PdfiumSource { document }))
    }
}

/// A pdfium-backed [`PageSource`] holding one open document.
struct PdfiumSource {
    document: PdfDocument<'static>,
}

impl PageSource for PdfiumSource {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&mut self, index: usize, dpi: u32) -> Result<DynamicImage, PageError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| PageError::RenderFailed {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        // Scale the page's native point size by dpi/72.
        let width = (page.width().value * dpi as f32 / 72.0).round().max(1.0) as i32;
        let height = (page.height().value * dpi as f32 / 72.0).round().max(1.0) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| PageError::RenderFailed {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px @ {} DPI",
            index + 1,
            image.width(),
            image.height(),
            dpi
        );
        Ok(image)
    }
}
