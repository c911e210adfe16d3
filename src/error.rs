//! Rich diagnostic error types for sft-pro.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. `SftError` wraps them
//! so the binary can surface any of them through a single `?`.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::llm::LlmError;
use crate::paths::PathError;
use crate::pipeline::PipelineError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SftError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

impl SftError {
    /// Which document-to-dataset failure this is, if it is one at all.
    ///
    /// Configuration and path errors happen before a document is touched and
    /// have no kind.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Extract(e) => Some(e.kind()),
            Self::Llm(e) => Some(e.kind()),
            Self::Pipeline(e) => e.kind(),
            Self::Config(_) | Self::Path(_) => None,
        }
    }
}

pub type SftResult<T> = std::result::Result<T, SftError>;

/// The ways turning one document into a dataset can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The input's extension is neither `pdf` nor `docx`.
    UnsupportedInput,
    /// The document could not be read or parsed.
    Extraction,
    /// The inference server could not be reached.
    Transport,
    /// The inference server answered with a non-200 status.
    Protocol,
    /// The inference server's body did not have the expected shape.
    Deserialization,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedInput => "unsupported-input",
            Self::Extraction => "extraction",
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Deserialization => "deserialization",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
