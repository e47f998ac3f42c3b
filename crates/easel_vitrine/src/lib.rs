//! # easel_vitrine
//!
//! Vitrine - The display case for Easel.
//!
//! ## Name Origin
//!
//! **Vitrine** (/vɪˈtriːn/) is a glass display case used in museums and
//! galleries to showcase precious objects. `easel_vitrine` puts a compiled
//! snippet on display as a complete HTML document.
//!
//! ## Modes
//!
//! - **Inline**: CSS and JS are embedded in `<style>` / `<script>` blocks,
//!   for sandboxed frames.
//! - **External files**: the document links `app.css` and `app.js`, whose
//!   contents are returned alongside it.
//!
//! In both modes the host runtime script is its own `<script src>` tag at the
//! top of `<head>` and never part of the inlined block.
//!
//! ## Example
//!
//! ```
//! use easel_atelier::{Snippet, SnippetCompiler};
//! use easel_vitrine::{render, RenderOptions};
//!
//! let snippet = Snippet::new("Hello")
//!     .with_script("javascript", "console.log(\"hi\");")
//!     .with_template("<div></div>");
//! let compiled = SnippetCompiler::default().compile(Some(&snippet)).unwrap();
//! let rendered = render(&compiled, &RenderOptions::inline());
//!
//! assert!(rendered.html.starts_with("<!DOCTYPE html>"));
//! assert!(rendered.html.contains("<div></div>"));
//! ```

mod options;
mod render;

pub use options::RenderOptions;
pub use render::{render, ExternalFiles, RenderedSnippet, APP_CSS, APP_JS};
