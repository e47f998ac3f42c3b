//! # easel_atelier
//!
//! Atelier - The workshop where snippets are compiled.
//!
//! A [`Snippet`] goes in, a [`CompiledSnippet`] (or a [`CompileError`]) comes
//! out. Two independent stages run side by side:
//!
//! ```text
//!              +--------------------+
//!   libraries  | easel_palette      |  script/link/host runtime URLs
//!  ----------->| LibraryResolver    |-------------------+
//!              +--------------------+                   |
//!                                                       v
//!              +--------------------+            +-------------+
//!   script     | ScriptCompiler     |  code      | Compiled-   |
//!  ----------->| oxc parse/check/   |----------->| Snippet     |
//!              | transform/codegen  |            +-------------+
//!              +--------------------+
//! ```
//!
//! The default `es5` target finishes with [`lower_to_es5`], which rewrites the
//! ES2015 syntax `oxc_transformer` leaves behind.
//!
//! Script compilation failures carry line-numbered diagnostics and are safe
//! to show to the snippet author verbatim; internal failures are not.
//!
//! ```
//! use easel_atelier::{CompilerConfig, Snippet, SnippetCompiler};
//!
//! let snippet = Snippet::new("Hello")
//!     .with_script("typescript", "const greeting: string = 'hi';\nconsole.log(greeting);")
//!     .with_libraries("jquery");
//!
//! let compiler = SnippetCompiler::new(CompilerConfig::default());
//! let compiled = compiler.compile(Some(&snippet)).unwrap();
//! assert!(compiled.script.contains("console.log(greeting)"));
//! assert_eq!(compiled.script_references, ["//unpkg.com/jquery"]);
//! ```

mod compile;
mod config;
pub mod downlevel;
mod error;
pub mod script;
mod snippet;

pub use compile::{CompiledSnippet, SnippetCompiler};
pub use config::CompilerConfig;
pub use downlevel::lower_to_es5;
pub use error::{CompileError, ErrorKind};
pub use script::{CompiledScript, ScriptCompiler, ScriptLanguage, ScriptOptions};
pub use snippet::{Snippet, SnippetBlock};

// Re-export the types that appear in this crate's public API.
pub use easel_canon::{Diagnostic, DiagnosticReport};
pub use easel_palette::{LibraryReferenceSet, ResolverConfig};
