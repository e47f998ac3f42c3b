//! Carton - The artist's toolbox for Easel.
//!
//! Shared, dependency-light utilities used by every stage of the snippet
//! pipeline:
//!
//! - **text**: whitespace and indentation normalization. Every string that
//!   leaves the pipeline goes through [`normalize`] so output is
//!   bit-reproducible for caching and diffing.
//! - **hash**: xxHash3 content fingerprints for cache keys.
//!
//! # Example
//!
//! ```
//! use easel_carton::normalize;
//!
//! let text = "\n\n\t\t<div>\n\t\t\t<p>hi</p>\n\t\t</div>\n\n";
//! assert_eq!(normalize(text), "<div>\n    <p>hi</p>\n</div>");
//! ```

pub mod hash;
pub mod text;

pub use hash::{content_hash, Fingerprint};
pub use text::{
    compute_minimum_indent, indent_all, normalize, reindent_left, strip_outer_blank_lines,
    strip_spaces, tabs_to_spaces, INDENT_WIDTH,
};
