//! Subcommands of the `easel` binary.

pub mod build;
pub mod check;
pub mod serve;

use std::path::Path;

use easel::atelier::Snippet;
use easel::loader::load_snippet;

/// Load a snippet file or exit with status 1.
fn load_or_exit(path: &Path) -> Snippet {
    match load_snippet(path) {
        Ok(snippet) => snippet,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            std::process::exit(1);
        }
    }
}
