//! # easel_palette
//!
//! Palette - the set of libraries a snippet paints with.
//!
//! A snippet declares its dependencies as free text, one entry per line:
//!
//! ```text
//! jquery
//! // comments are ignored
//! @types/jquery
//! https://appsforoffice.microsoft.com/lib/1/hosted/office.js
//! office-ui-fabric-js/dist/css/fabric.min.css
//! ```
//!
//! Each line is classified by an ordered rule table ([`LibraryLineKind`]) and
//! runtime entries are resolved to URLs. The result is a
//! [`LibraryReferenceSet`]: ordered script and stylesheet URLs plus at most one
//! host runtime (Office.js) reference, which must be loaded outside the
//! sandboxed document.
//!
//! Resolution is total: every input string produces a result, unrecognized
//! syntax degrades to a script reference, and nothing touches the network.
//!
//! ```
//! use easel_palette::{LibraryResolver, ResolverConfig};
//!
//! let resolver = LibraryResolver::new(ResolverConfig::default());
//! let set = resolver.resolve("b.js\na.css\nc.js");
//! assert_eq!(set.script_references, ["//unpkg.com/b.js", "//unpkg.com/c.js"]);
//! assert_eq!(set.link_references, ["//unpkg.com/a.css"]);
//! ```

mod kind;
mod resolve;

pub use kind::{classify_line, LibraryLineKind};
pub use resolve::{
    is_host_runtime_url, resolve_libraries, resolve_url, LibraryReferenceSet, LibraryResolver,
    ResolverConfig, DEFAULT_CDN_HOST,
};
