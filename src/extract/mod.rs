//! Document text extraction and format detection.
//!
//! Each supported format (PDF, DOCX) implements `ContentParser`.
//! `extract_text()` picks the parser from the file extension, runs it over the
//! file's bytes and cuts the result to a fixed character budget.

pub mod docx;
pub mod error;
pub mod pdf;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use error::{ExtractError, ExtractResult};

/// Default cap on the characters of document text placed in a prompt.
pub const DEFAULT_TEXT_LIMIT: usize = 16_000;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Lowercase extension form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Uppercase form for messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }

    /// Match an extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for format-specific text extractors.
pub trait ContentParser {
    /// Extract the plain text of a document from its raw bytes.
    fn parse(&self, data: &[u8]) -> ExtractResult<String>;

    /// The format this parser handles.
    fn format(&self) -> DocumentFormat;
}

/// Get the parser for a document format.
pub fn parser_for(format: DocumentFormat) -> Box<dyn ContentParser> {
    match format {
        DocumentFormat::Pdf => Box::new(pdf::PdfParser),
        DocumentFormat::Docx => Box::new(docx::DocxParser),
    }
}

/// Detect the document format from a path's extension.
///
/// The error carries the extension as written, or an empty string when the
/// path has none.
pub fn detect_format(path: &Path) -> ExtractResult<DocumentFormat> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    DocumentFormat::from_extension(&ext).ok_or(ExtractError::UnsupportedType { extension: ext })
}

/// Text extracted from one document, already cut to the character budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub origin: PathBuf,
    pub format: DocumentFormat,
    /// Whether characters past the budget were dropped.
    pub truncated: bool,
}

impl ExtractedText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Front-slice `text` to at most `limit` characters.
///
/// The cut ignores word boundaries but never splits a character.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Extract the text of the document at `path`, keeping at most `limit` characters.
pub fn extract_text(path: &Path, limit: usize) -> ExtractResult<ExtractedText> {
    let format = detect_format(path)?;
    tracing::info!(path = %path.display(), %format, "extracting text");

    let data =
        std::fs::read(path).map_err(|e| ExtractError::failed(format, e.to_string()))?;
    let full = parser_for(format).parse(&data)?;

    let kept = truncate_chars(&full, limit);
    let truncated = kept.len() < full.len();
    if truncated {
        tracing::info!(
            limit,
            dropped_bytes = full.len() - kept.len(),
            "document text exceeds limit, truncating"
        );
    }
    let text = kept.to_string();
    tracing::debug!(chars = text.chars().count(), "extraction finished");

    Ok(ExtractedText {
        text,
        origin: path.to_path_buf(),
        format,
        truncated,
    })
}

/// Like [`extract_text`], but never fails: on error the error's message is
/// returned in place of the document text, cut to the same budget.
pub fn extract_or_message(path: &Path, limit: usize) -> String {
    match extract_text(path, limit) {
        Ok(doc) => doc.text,
        Err(e) => {
            tracing::warn!(path = %path.display(), kind = %e.kind(), "{e}");
            truncate_chars(&e.to_string(), limit).to_string()
        }
    }
}
