//! PDF text extraction using the `pdf-extract` crate.
//!
//! All pages are stripped in order and returned as one string, page text
//! concatenated as the backend emits it.

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{ContentParser, DocumentFormat};

/// PDF parser backed by `pdf-extract`.
pub struct PdfParser;

impl ContentParser for PdfParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn parse(&self, data: &[u8]) -> ExtractResult<String> {
        // pdf-extract panics on some malformed inputs instead of returning Err.
        // The process-wide panic hook still prints its message to stderr; it
        // is not swapped here because the hook is shared with other threads.
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError::failed(DocumentFormat::Pdf, e.to_string())),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "PDF parser panicked".into());
                tracing::warn!("pdf-extract panicked: {message}");
                Err(ExtractError::failed(DocumentFormat::Pdf, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_pdf_bytes_fail() {
        // pdf-extract needs real PDF bytes; the happy path lives in tests/extract.rs.
        let result = PdfParser.parse(b"This is not a PDF");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Failed {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }
}
