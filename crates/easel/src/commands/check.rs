//! Check command - Compile a snippet and report diagnostics

use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use easel::atelier::{CompileError, Diagnostic, SnippetCompiler};
use easel::config::EaselConfig;

use super::load_or_exit;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human readable report
    #[default]
    Text,
    /// JSON with the diagnostics
    Json,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Snippet file (.json, .yaml or .yml)
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// JSON output structure
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput {
    file: String,
    error_count: usize,
    diagnostics: Vec<Diagnostic>,
}

pub fn run(args: CheckArgs, config: &EaselConfig) {
    let snippet = load_or_exit(&args.input);
    let compiler = SnippetCompiler::new(config.compiler.clone());

    let diagnostics = match compiler.compile(Some(&snippet)) {
        Ok(_) => Vec::new(),
        Err(CompileError::Diagnostics(report)) => report.into_diagnostics(),
        Err(e) => {
            eprintln!("\x1b[31mError checking {}:\x1b[0m {}", args.input.display(), e);
            std::process::exit(1);
        }
    };
    let failed = !diagnostics.is_empty();

    match args.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                file: args.input.display().to_string(),
                error_count: diagnostics.len(),
                diagnostics,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Text => {
            if failed {
                for diagnostic in &diagnostics {
                    eprintln!("{}\n", diagnostic);
                }
                eprintln!(
                    "\x1b[31m✗\x1b[0m {}: {} error(s)",
                    args.input.display(),
                    diagnostics.len()
                );
            } else {
                eprintln!("\x1b[32m✓\x1b[0m {}: no errors", args.input.display());
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
