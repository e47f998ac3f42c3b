//! # easel_glyph
//!
//! Glyph - Deterministic JavaScript layout for Easel.
//!
//! ## Name Origin
//!
//! **Glyph** (/ɡlɪf/) refers to the visual representation of a character,
//! the form that gives meaning to written symbols. `easel_glyph` gives the
//! script blocks of assembled documents a stable, readable shape.
//!
//! The same input always produces the same output. Formatting failures are
//! reported as [`FormatError`] and never panic.
//!
//! ## Example
//!
//! ```
//! use easel_glyph::{format_script, FormatOptions};
//!
//! let formatted = format_script("if(ready){run()}", &FormatOptions::default()).unwrap();
//! assert_eq!(formatted, "if (ready) {\n    run();\n}");
//! ```

mod error;
mod options;
mod script;

pub use error::*;
pub use options::*;

/// Format a JavaScript source string.
///
/// Blank input yields an empty string. The result has no trailing newline.
#[inline]
pub fn format_script(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    script::format_script_content(source, options)
}
