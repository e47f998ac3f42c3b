//! Configuration file loading for easel.
//!
//! Reads `easel.config.json` from the current working directory, or from an
//! explicit path. Every field is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use easel_atelier::CompilerConfig;
use easel_vitrine::RenderOptions;

use crate::pipeline::DEFAULT_CACHE_CAPACITY;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "easel.config.json";

/// Top-level easel configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EaselConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Library resolution and script compilation.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Default document options. Per-request options replace these.
    #[serde(default)]
    pub render: RenderOptions,

    /// HTTP boundary.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the `serve` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Upper bound for a single compile request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Keep rendered documents keyed by content fingerprint.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Most documents the cache holds; the least recently used goes first.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl ServerConfig {
    /// Capacity handed to the pipeline; zero when caching is off.
    pub fn effective_cache_capacity(&self) -> usize {
        if self.cache {
            self.cache_capacity
        } else {
            0
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_ms: default_request_timeout_ms(),
            cache: true,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

/// Load `easel.config.json` from the given directory (or CWD if None).
pub fn load_config(dir: Option<&Path>) -> EaselConfig {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        return EaselConfig::default();
    }

    load_config_file(&config_path)
}

/// Load a configuration file. Unreadable or invalid files produce a warning
/// and the default configuration.
pub fn load_config_file(config_path: &Path) -> EaselConfig {
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "\x1b[33mWarning:\x1b[0m Failed to parse {}: {}",
                    config_path.display(),
                    e
                );
                EaselConfig::default()
            }
        },
        Err(e) => {
            eprintln!(
                "\x1b[33mWarning:\x1b[0m Failed to read {}: {}",
                config_path.display(),
                e
            );
            EaselConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(Some(dir.path())), EaselConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{
                "$schema": "./schema.json",
                "compiler": { "cdnHost": "cdn.jsdelivr.net/npm" },
                "render": { "inlineJsAndCssIntoIframe": true },
                "server": { "requestTimeoutMs": 250 }
            }"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()));
        assert_eq!(config.schema.as_deref(), Some("./schema.json"));
        assert_eq!(config.compiler.cdn_host, "cdn.jsdelivr.net/npm");
        assert_eq!(config.compiler.target, "es5");
        assert!(config.render.inline_js_and_css_into_iframe);
        assert!(config.render.include_host_initialize_wrapper);
        assert_eq!(config.server.request_timeout_ms, 250);
        assert_eq!(config.server.addr, "127.0.0.1:3000");
        assert!(config.server.cache);
        assert_eq!(config.server.effective_cache_capacity(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_cache_capacity() {
        let server: ServerConfig = serde_json::from_str(r#"{ "cacheCapacity": 8 }"#).unwrap();
        assert_eq!(server.effective_cache_capacity(), 8);

        let server: ServerConfig =
            serde_json::from_str(r#"{ "cache": false, "cacheCapacity": 8 }"#).unwrap();
        assert_eq!(server.effective_cache_capacity(), 0);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();
        assert_eq!(load_config(Some(dir.path())), EaselConfig::default());
    }
}
