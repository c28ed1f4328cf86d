use std::path::Path;

use citescan_core::{BackendError, PlainTextBackend, TextBackend};
use citescan_parsing::text_processing::expand_ligatures;

/// `pdf-extract` implementation of [`TextBackend`].
///
/// Pages are returned in document order as one string. Ligature glyphs
/// (`ﬁ`, `ﬂ`, ...) are expanded so headlines and URLs match as plain ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for PdfExtractBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path)
            .map_err(|e| BackendError::OpenError(format!("{}: {}", path.display(), e)))?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        tracing::debug!(path = %path.display(), chars = text.len(), "extracted pdf text");
        Ok(expand_ligatures(&text))
    }
}

/// Whether `path` should be read through the PDF backend.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Pick a backend by file extension: PDFs through `pdf-extract`, anything
/// else read as (lossy) UTF-8 text.
pub fn backend_for(path: &Path) -> Box<dyn TextBackend> {
    if is_pdf(path) {
        Box::new(PdfExtractBackend)
    } else {
        Box::new(PlainTextBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_by_extension() {
        assert!(is_pdf(Path::new("report.pdf")));
        assert!(is_pdf(Path::new("REPORT.PDF")));
        assert!(!is_pdf(Path::new("report.txt")));
        assert!(!is_pdf(Path::new("report")));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = PdfExtractBackend
            .extract_text(Path::new("/nonexistent/citescan/report.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }

    #[test]
    fn test_non_pdf_bytes_fail_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();
        let err = PdfExtractBackend.extract_text(&path).unwrap_err();
        assert!(matches!(err, BackendError::ExtractionError(_)));
    }

    #[test]
    fn test_text_files_use_plain_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "References\n[1] [Web] A: https://a.org").unwrap();
        let text = backend_for(&path).extract_text(&path).unwrap();
        assert!(text.starts_with("References"));
    }
}
