//! URL resolution and reference collection.

use serde::{Deserialize, Serialize};

use crate::kind::{classify_line, LibraryLineKind};

/// CDN used for bare package names.
pub const DEFAULT_CDN_HOST: &str = "unpkg.com";

const ABSOLUTE_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];
const HOST_RUNTIME_FILES: [&str; 2] = ["office.js", "office.debug.js"];

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Host that bare entries resolve against, as `//<cdn_host>/<entry>`.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
        }
    }
}

fn default_cdn_host() -> String {
    DEFAULT_CDN_HOST.to_string()
}

/// Runtime references of a snippet, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryReferenceSet {
    /// Script URLs, excluding the host runtime.
    pub script_references: Vec<String>,
    /// Stylesheet URLs.
    pub link_references: Vec<String>,
    /// The single host runtime URL, if declared.
    pub host_runtime_reference: Option<String>,
}

impl LibraryReferenceSet {
    /// Total number of runtime references.
    pub fn len(&self) -> usize {
        self.script_references.len()
            + self.link_references.len()
            + usize::from(self.host_runtime_reference.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies and resolves libraries blocks.
#[derive(Debug, Clone, Default)]
pub struct LibraryResolver {
    config: ResolverConfig,
}

impl LibraryResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Classify a single line.
    pub fn classify(&self, line: &str) -> LibraryLineKind {
        classify_line(line, &self.config)
    }

    /// Resolve a whole libraries block.
    ///
    /// When more than one host runtime line is present, the first one wins and
    /// the rest are dropped with a warning.
    pub fn resolve(&self, libraries: &str) -> LibraryReferenceSet {
        let mut set = LibraryReferenceSet::default();

        for line in libraries.lines() {
            match self.classify(line) {
                LibraryLineKind::Empty
                | LibraryLineKind::Comment
                | LibraryLineKind::TypingsOnly => {}
                LibraryLineKind::Stylesheet(url) => set.link_references.push(url),
                LibraryLineKind::Script(url) => set.script_references.push(url),
                LibraryLineKind::HostRuntime(url) => match &set.host_runtime_reference {
                    Some(first) => {
                        tracing::warn!(
                            kept = %first,
                            ignored = %url,
                            "more than one host runtime reference defined; keeping the first"
                        );
                    }
                    None => set.host_runtime_reference = Some(url),
                },
            }
        }

        tracing::debug!(
            scripts = set.script_references.len(),
            links = set.link_references.len(),
            host_runtime = set.host_runtime_reference.is_some(),
            "resolved libraries"
        );

        set
    }
}

/// Resolve a libraries block with the given configuration.
pub fn resolve_libraries(libraries: &str, config: &ResolverConfig) -> LibraryReferenceSet {
    LibraryResolver::new(config.clone()).resolve(libraries)
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Resolve an entry to a URL. Absolute URLs are kept, anything else becomes a
/// protocol-relative CDN URL.
pub fn resolve_url(entry: &str, config: &ResolverConfig) -> String {
    if ABSOLUTE_SCHEMES
        .iter()
        .any(|scheme| starts_with_ignore_ascii_case(entry, scheme))
    {
        return entry.to_string();
    }

    let host = config.cdn_host.trim_end_matches('/');
    let entry = entry.trim_start_matches('/');
    let mut url = String::with_capacity(host.len() + entry.len() + 3);
    url.push_str("//");
    url.push_str(host);
    url.push('/');
    url.push_str(entry);
    url
}

/// The path part of a URL, without query string or fragment.
fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Last path segment of a URL.
fn file_name(url: &str) -> &str {
    let path = url_path(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether the URL path ends in `.<extension>` (case-insensitive).
pub(crate) fn has_extension(url: &str, extension: &str) -> bool {
    file_name(url)
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(extension))
}

/// Whether the URL names the host runtime script (`office.js` or
/// `office.debug.js`, case-insensitive).
pub fn is_host_runtime_url(url: &str) -> bool {
    let name = file_name(url);
    HOST_RUNTIME_FILES
        .iter()
        .any(|candidate| name.eq_ignore_ascii_case(candidate))
}
