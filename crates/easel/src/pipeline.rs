//! Compile-then-render pipeline with an optional bounded render cache.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::Serialize;

use easel_atelier::{CompileError, CompilerConfig, Snippet, SnippetCompiler};
use easel_carton::Fingerprint;
use easel_vitrine::{render, RenderOptions, RenderedSnippet};

/// Documents kept by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// A rendered document and the fingerprint it is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub fingerprint: String,
    #[serde(flatten)]
    pub rendered: RenderedSnippet,
}

/// Snippet compiler plus document assembly.
///
/// Safe to share between threads. The cache is keyed by the authored snippet
/// and the render options, so a hit skips compilation. Concurrent misses for
/// the same key both compile; the results are identical.
#[derive(Debug)]
pub struct Pipeline {
    compiler: SnippetCompiler,
    cache: Option<Mutex<LruCache<String, RenderedSnippet>>>,
}

impl Pipeline {
    /// A `cache_capacity` of zero disables the cache.
    pub fn new(config: CompilerConfig, cache_capacity: usize) -> Self {
        Self {
            compiler: SnippetCompiler::new(config),
            cache: NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn compiler(&self) -> &SnippetCompiler {
        &self.compiler
    }

    /// Number of cached documents.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| lock(cache).len())
    }

    /// Compile and render a snippet.
    pub fn run(
        &self,
        snippet: Option<&Snippet>,
        options: &RenderOptions,
    ) -> Result<PipelineOutput, CompileError> {
        let Some(snippet) = snippet else {
            return Err(CompileError::MissingSnippet);
        };
        let fingerprint = cache_key(&snippet.fingerprint(), options);

        if let Some(cache) = &self.cache {
            let hit = lock(cache).get(&fingerprint).cloned();
            if let Some(rendered) = hit {
                tracing::debug!(%fingerprint, "render cache hit");
                return Ok(PipelineOutput {
                    fingerprint,
                    rendered,
                });
            }
        }

        let compiled = self.compiler.compile(Some(snippet))?;
        let rendered = render(&compiled, options);
        if let Some(cache) = &self.cache {
            if let Some((evicted, _)) = lock(cache).push(fingerprint.clone(), rendered.clone()) {
                if evicted != fingerprint {
                    tracing::trace!(%evicted, "render cache eviction");
                }
            }
        }
        Ok(PipelineOutput {
            fingerprint,
            rendered,
        })
    }
}

/// The cache holds only finished documents, so a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cache_key(snippet: &str, options: &RenderOptions) -> String {
    Fingerprint::new()
        .field(snippet)
        .flag(options.inline_js_and_css_into_iframe)
        .flag(options.include_host_initialize_wrapper)
        .optional(options.sandbox_ready_callback.as_deref())
        .optional(options.empty_template_fallback.as_deref())
        .flag(options.runner_chrome)
        .field(&options.host_global)
        .finish()
}
