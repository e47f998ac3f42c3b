//! Error types for easel_glyph.

use thiserror::Error;

/// Errors that can occur during formatting
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// Error parsing JavaScript
    #[error("Failed to parse script: {0}")]
    ScriptParseError(String),

    /// The parser gave up without reporting errors
    #[error("Failed to format script: {0}")]
    ScriptFormatError(String),
}
