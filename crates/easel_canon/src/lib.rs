//! # easel_canon
//!
//! Canon - the standard of correctness for Easel scripts.
//!
//! Turns byte-offset diagnostics into the line-numbered, human-readable form
//! shown to snippet authors, and provides the small type check that runs
//! alongside transpilation.
//!
//! ```text
//! Line #1:  Type 'string' is not assignable to type 'number'.
//!
//! let x: number = 'a';
//! ```

mod checker;
mod diagnostic;

pub use checker::{check_literal_assignability, LiteralTypeChecker};
pub use diagnostic::{
    line_number_at, Diagnostic, DiagnosticReport, SpanDiagnostic, TypeErrorCode,
};
