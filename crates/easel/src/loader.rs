//! Snippet file loading.
//!
//! `.json` files are read with serde_json, `.yaml` / `.yml` files with
//! serde_yaml.

use std::path::{Path, PathBuf};

use thiserror::Error;

use easel_atelier::Snippet;

/// Errors that can occur while loading a snippet file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported snippet file {0} (expected .json, .yaml or .yml)")]
    UnsupportedExtension(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnippetFormat {
    Json,
    Yaml,
}

impl SnippetFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}

/// Load a snippet file, choosing the format by extension.
pub fn load_snippet(path: &Path) -> Result<Snippet, LoadError> {
    let format = SnippetFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedExtension(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format {
        SnippetFormat::Json => serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        SnippetFormat::Yaml => serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}
