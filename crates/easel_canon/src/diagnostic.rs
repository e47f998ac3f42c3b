//! Diagnostics and their line-numbered presentation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// TypeScript-compatible error codes produced by the Easel checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum TypeErrorCode {
    /// Type is not assignable.
    TypeNotAssignable = 2322,
}

impl TypeErrorCode {
    /// Get the numeric code.
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable name for the error code.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeNotAssignable => "type-not-assignable",
        }
    }
}

/// A diagnostic located by byte offsets into the script source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanDiagnostic {
    /// Checker error code, if the diagnostic came from the type check.
    pub code: Option<TypeErrorCode>,
    /// Error message.
    pub message: String,
    /// Start byte offset.
    pub start: u32,
    /// End byte offset.
    pub end: u32,
}

impl SpanDiagnostic {
    /// Create a diagnostic without a code (parser, semantic or transform error).
    pub fn new(message: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            code: None,
            message: message.into(),
            start,
            end,
        }
    }

    /// Create a type error diagnostic.
    pub fn type_error(code: TypeErrorCode, message: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            start,
            end,
        }
    }

    /// Map to a line-numbered diagnostic against `source`.
    pub fn locate(&self, source: &str) -> Diagnostic {
        Diagnostic::locate(source, self.message.clone(), self.start)
    }
}

/// A compiler diagnostic as presented to the snippet author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// 1-based line of the diagnostic start.
    pub line_number: usize,
    /// Error message.
    pub message: String,
    /// Trimmed source text of the offending line.
    pub line_text: String,
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// 1-based line number of a byte offset: newlines before it, plus one.
pub fn line_number_at(source: &str, offset: usize) -> usize {
    let offset = floor_char_boundary(source, offset);
    source.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

impl Diagnostic {
    /// Locate a diagnostic starting at byte offset `start` in `source`.
    ///
    /// The line text is the whole line containing `start`, trimmed. Offsets
    /// past the end of the source are clamped to the last line.
    pub fn locate(source: &str, message: impl Into<String>, start: u32) -> Self {
        let start = floor_char_boundary(source, start as usize);

        let line_start = source[..start].rfind('\n').map_or(0, |index| index + 1);
        let line_end = source[start..]
            .find('\n')
            .map_or(source.len(), |index| start + index);

        Self {
            line_number: line_number_at(source, start),
            message: message.into(),
            line_text: source[line_start..line_end].trim().to_string(),
        }
    }

    /// `Line #<n>:  <message>` followed by a blank line and the source line.
    pub fn render(&self) -> String {
        format!(
            "Line #{}:  {}\n\n{}",
            self.line_number, self.message, self.line_text
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// One or more diagnostics from a failed compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Rendered diagnostics separated by two blank lines.
impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                f.write_str("\n\n\n")?;
            }
            f.write_str(&diagnostic.render())?;
        }
        Ok(())
    }
}
