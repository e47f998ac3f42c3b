//! Serve command - HTTP compile server

use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use easel::config::EaselConfig;
use easel::pipeline::Pipeline;
use easel::server;

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (overrides server.addr)
    #[arg(long)]
    pub addr: Option<String>,

    /// Disable the render cache
    #[arg(long)]
    pub no_cache: bool,
}

pub fn run(args: ServeArgs, config: &EaselConfig) {
    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    let cache_capacity = if args.no_cache {
        0
    } else {
        config.server.effective_cache_capacity()
    };
    let pipeline = Arc::new(Pipeline::new(config.compiler.clone(), cache_capacity));
    let timeout = Duration::from_millis(config.server.request_timeout_ms);
    let app = server::router(pipeline, config.render.clone(), timeout);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = server::serve(&addr, app).await {
            eprintln!("Server error on {}: {}", addr, e);
            std::process::exit(1);
        }
    });
}
