//! Snippet compilation.
//!
//! Library resolution and script compilation are independent, so they run on
//! the rayon pool side by side. The result is identical to running them in
//! sequence.

use serde::Serialize;

use easel_carton::Fingerprint;
use easel_palette::{LibraryReferenceSet, LibraryResolver};

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::script::{ScriptCompiler, ScriptLanguage};
use crate::snippet::Snippet;

/// A snippet with its script compiled and its libraries resolved.
///
/// Immutable; the sole input of the HTML assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledSnippet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub host: String,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
    /// Compiled JavaScript.
    pub script: String,
    pub style: String,
    pub template: String,
    pub script_references: Vec<String>,
    pub link_references: Vec<String>,
    pub host_runtime_reference: Option<String>,
}

impl CompiledSnippet {
    fn new(snippet: &Snippet, script: String, references: LibraryReferenceSet) -> Self {
        Self {
            id: snippet.id.clone(),
            name: snippet.name.clone(),
            description: snippet.description.clone(),
            author: snippet.author.clone(),
            host: snippet.host.clone(),
            created_at: snippet.created_at,
            modified_at: snippet.modified_at,
            script,
            style: snippet.style.content.clone(),
            template: snippet.template.content.clone(),
            script_references: references.script_references,
            link_references: references.link_references,
            host_runtime_reference: references.host_runtime_reference,
        }
    }

    /// Stable content fingerprint over every field.
    pub fn fingerprint(&self) -> String {
        let timestamp = |t: Option<i64>| t.map(|t| t.to_string());
        Fingerprint::new()
            .field(&self.id)
            .field(&self.name)
            .field(&self.description)
            .field(&self.author)
            .field(&self.host)
            .optional(timestamp(self.created_at).as_deref())
            .optional(timestamp(self.modified_at).as_deref())
            .field(&self.script)
            .field(&self.style)
            .field(&self.template)
            .list(&self.script_references)
            .list(&self.link_references)
            .optional(self.host_runtime_reference.as_deref())
            .finish()
    }
}

/// Compiles snippets.
#[derive(Debug, Clone, Default)]
pub struct SnippetCompiler {
    resolver: LibraryResolver,
    scripts: ScriptCompiler,
}

impl SnippetCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            resolver: LibraryResolver::new(config.resolver_config()),
            scripts: ScriptCompiler::new(config.script_options()),
        }
    }

    /// Compile a snippet.
    ///
    /// Input is validated before any work starts. When the script fails to
    /// compile, the script compiler's error is returned unchanged and the
    /// resolved libraries are discarded.
    pub fn compile(&self, snippet: Option<&Snippet>) -> Result<CompiledSnippet, CompileError> {
        let snippet = snippet.ok_or(CompileError::MissingSnippet)?;
        ScriptLanguage::from_tag(&snippet.script.language)?;

        let (references, script) = rayon::join(
            || self.resolver.resolve(&snippet.libraries),
            || self.scripts.compile(&snippet.script),
        );

        let code = script.and_then(|compiled| compiled.into_code()).map_err(|error| {
            if let CompileError::Internal(message) = &error {
                tracing::error!(snippet = %snippet.id, %message, "snippet compilation failed");
            }
            error
        })?;

        Ok(CompiledSnippet::new(snippet, code, references))
    }
}
