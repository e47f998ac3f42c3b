//! # Easel
//!
//! Snippet compilation and HTML assembly.
//!
//! This crate hosts the `easel` command line (config file, `build`, `check`,
//! `serve`) and re-exports the Easel sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Text normalization and content fingerprints
//! - [`palette`] - Library reference resolution
//! - [`canon`] - Line-mapped diagnostics and literal type checks
//! - [`atelier`] - Snippet model and compilation
//! - [`glyph`] - JavaScript layout
//! - [`vitrine`] - HTML document assembly

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod server;

/// Text normalization and content fingerprints.
pub use easel_carton as carton;

/// Library reference resolution.
pub use easel_palette as palette;

/// Line-mapped diagnostics and literal type checks.
pub use easel_canon as canon;

/// Snippet model and compilation.
pub use easel_atelier as atelier;

/// JavaScript layout.
pub use easel_glyph as glyph;

/// HTML document assembly.
pub use easel_vitrine as vitrine;
