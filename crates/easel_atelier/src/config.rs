//! Compiler configuration.

use serde::{Deserialize, Serialize};

use easel_palette::{ResolverConfig, DEFAULT_CDN_HOST};

use crate::script::ScriptOptions;

/// Configuration shared by the resolver and the script compiler.
///
/// Passed in at construction time; nothing in the pipeline reads global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Host that bare library names resolve against.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,

    /// ECMAScript target for TypeScript output (`es5`, `es2015`, ... `esnext`).
    #[serde(default = "default_target")]
    pub target: String,

    /// Remove CommonJS/ES module interop boilerplate from compiled output.
    #[serde(default = "default_true")]
    pub strip_module_interop: bool,

    /// Run the literal assignability check before transpiling.
    #[serde(default = "default_true")]
    pub type_check: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
            target: default_target(),
            strip_module_interop: true,
            type_check: true,
        }
    }
}

fn default_cdn_host() -> String {
    DEFAULT_CDN_HOST.to_string()
}

fn default_target() -> String {
    "es5".to_string()
}

fn default_true() -> bool {
    true
}

impl CompilerConfig {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cdn_host: self.cdn_host.clone(),
        }
    }

    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            target: self.target.clone(),
            strip_module_interop: self.strip_module_interop,
            type_check: self.type_check,
        }
    }
}
