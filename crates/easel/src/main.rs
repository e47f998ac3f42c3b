//! # easel
//!
//! Command line for compiling snippets into runnable HTML documents.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use easel::config::{load_config, load_config_file, EaselConfig};

#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Compile snippets into runnable HTML documents", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),

    /// Configuration file (default: ./easel.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a snippet file into index.html
    #[command(visible_alias = "atelier")]
    Build(commands::build::BuildArgs),

    /// Compile a snippet file and report diagnostics
    Check(commands::check::CheckArgs),

    /// Start the HTTP compile server
    #[command(visible_alias = "vitrine")]
    Serve(commands::serve::ServeArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("easel=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let config: EaselConfig = match &cli.config {
        Some(path) => load_config_file(path),
        None => load_config(None),
    };

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &config),
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Serve(args) => commands::serve::run(args, &config),
    }
}
