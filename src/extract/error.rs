//! Rich diagnostic error types for text extraction.
//!
//! The display strings double as the in-band messages returned by
//! [`extract_or_message`](super::extract_or_message), so they are phrased for
//! end users rather than for logs.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::FailureKind;
use crate::extract::DocumentFormat;

/// Errors from text extraction.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("Unsupported file type: {extension}")]
    #[diagnostic(
        code(sft::extract::unsupported_type),
        help("Supported formats are pdf and docx. Convert the document to one of them first.")
    )]
    UnsupportedType { extension: String },

    #[error("Error extracting text from {}: {message}", .format.label())]
    #[diagnostic(
        code(sft::extract::failed),
        help(
            "The document could not be read or parsed. Verify the file exists, \
             is readable, and is a valid, unencrypted document."
        )
    )]
    Failed {
        format: DocumentFormat,
        message: String,
    },
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedType { .. } => FailureKind::UnsupportedInput,
            Self::Failed { .. } => FailureKind::Extraction,
        }
    }

    pub(crate) fn failed(format: DocumentFormat, message: impl Into<String>) -> Self {
        Self::Failed {
            format,
            message: message.into(),
        }
    }
}

/// Convenience alias for extraction results.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
