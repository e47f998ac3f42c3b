//! Line classification.
//!
//! The cascade is an explicit ordered table of `(predicate, action)` rules.
//! The first rule whose predicate accepts the trimmed line decides its kind;
//! a line no rule accepts is a runtime reference, so classification is total.

use crate::resolve::{has_extension, is_host_runtime_url, resolve_url, ResolverConfig};

/// Kind of a single line in a snippet's libraries block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLineKind {
    /// Blank line.
    Empty,
    /// `// ...`, `/* ...` or `... */`.
    Comment,
    /// Type definitions only (`@types/...`, `dt~...`, `*.d.ts`); nothing to load.
    TypingsOnly,
    /// Stylesheet URL, emitted as `<link rel="stylesheet">`.
    Stylesheet(String),
    /// Script URL, emitted as `<script src>`.
    Script(String),
    /// Host runtime (Office.js) URL, loaded outside the sandbox.
    HostRuntime(String),
}

impl LibraryLineKind {
    /// Whether the line contributes a runtime reference.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Stylesheet(_) | Self::Script(_) | Self::HostRuntime(_)
        )
    }

    /// Resolved URL of a runtime reference.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stylesheet(url) | Self::Script(url) | Self::HostRuntime(url) => Some(url),
            _ => None,
        }
    }
}

type Predicate = fn(&str) -> bool;
type Action = fn(&str, &ResolverConfig) -> LibraryLineKind;

struct Rule {
    name: &'static str,
    matches: Predicate,
    action: Action,
}

const RULES: &[Rule] = &[
    Rule {
        name: "empty",
        matches: |line| line.is_empty(),
        action: |_, _| LibraryLineKind::Empty,
    },
    Rule {
        name: "comment",
        matches: |line| line.starts_with("//") || line.starts_with("/*") || line.ends_with("*/"),
        action: |_, _| LibraryLineKind::Comment,
    },
    Rule {
        name: "types-package",
        matches: |line| line.starts_with("@types"),
        action: |_, _| LibraryLineKind::TypingsOnly,
    },
    Rule {
        name: "definitely-typed",
        matches: |line| line.starts_with("dt~"),
        action: |_, _| LibraryLineKind::TypingsOnly,
    },
    Rule {
        name: "declaration-file",
        matches: |line| line.to_ascii_lowercase().ends_with(".d.ts"),
        action: |_, _| LibraryLineKind::TypingsOnly,
    },
];

fn runtime_reference(line: &str, config: &ResolverConfig) -> LibraryLineKind {
    let url = resolve_url(line, config);

    if has_extension(&url, "css") {
        LibraryLineKind::Stylesheet(url)
    } else if is_host_runtime_url(&url) {
        LibraryLineKind::HostRuntime(url)
    } else {
        // `.js`, `.ts` and anything unrecognized load as scripts.
        LibraryLineKind::Script(url)
    }
}

/// Classify a single line of a libraries block.
pub fn classify_line(line: &str, config: &ResolverConfig) -> LibraryLineKind {
    let line = line.trim();
    for rule in RULES {
        if (rule.matches)(line) {
            tracing::trace!(rule = rule.name, line, "classified library line");
            return (rule.action)(line, config);
        }
    }
    tracing::trace!(rule = "runtime-reference", line, "classified library line");
    runtime_reference(line, config)
}
