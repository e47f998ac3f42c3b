//! Compilation errors.

use serde::Serialize;
use thiserror::Error;

use easel_canon::DiagnosticReport;

/// Errors that can occur while compiling a snippet.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// No snippet was supplied.
    #[error("no snippet was provided")]
    MissingSnippet,

    /// The snippet script has no language tag.
    #[error("snippet script has no language")]
    MissingLanguage,

    /// The script did not compile. Safe to show to the snippet author.
    #[error("{0}")]
    Diagnostics(DiagnosticReport),

    /// Unexpected compiler failure. Details are for logs only.
    #[error("internal compiler error: {0}")]
    Internal(String),
}

/// Coarse classification used by callers to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad input; fix the payload and retry.
    Validation,
    /// Script diagnostics.
    Compilation,
    /// Internal failure.
    Internal,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSnippet | Self::MissingLanguage => ErrorKind::Validation,
            Self::Diagnostics(_) => ErrorKind::Compilation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the message can be shown to the end user verbatim.
    pub fn is_user_facing(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticReport> {
        match self {
            Self::Diagnostics(report) => Some(report),
            _ => None,
        }
    }
}
