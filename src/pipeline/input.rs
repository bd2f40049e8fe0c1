//! Input validation: confirm a caller-supplied path is a readable PDF.
//!
//! We validate the PDF magic bytes (`%PDF`) before handing the path to
//! pdfium so callers get a meaningful error rather than an opaque parser
//! failure on, say, a Word document with a `.pdf` extension.

use crate::error::PdfMonoError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
pub fn validate_input(path: &Path) -> Result<(), PdfMonoError> {
    if !path.exists() {
        return Err(PdfMonoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PdfMonoError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfMonoError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PdfMonoError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = validate_input(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, PdfMonoError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"PK\x03\x04 not a pdf")
            .unwrap();
        let err = validate_input(&path).unwrap_err();
        assert!(matches!(err, PdfMonoError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.7\n")
            .unwrap();
        assert!(validate_input(&path).is_ok());
    }
}
