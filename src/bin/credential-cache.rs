use std::sync::Arc;

use clap::arg;
use clap::command;
use clap::Parser;
use credential_cache::cache::token_cache::TokenCache;
use credential_cache::fetcher::build_fetcher;
use credential_cache::resilience::retry::RetrySettings;
use credential_cache::server;
use credential_cache::utils::config_loader;
use credential_cache::utils::logging;
use anyhow::Result;
use credential_cache::utils::logging::LogLevel;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "credential-cache.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print one token to stdout and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Build fetcher and cache
    // -------------------------------

    let fetcher = build_fetcher(&service_config.fetcher)?;
    info!(fetcher = %service_config.fetcher.kind(), "fetcher ready");
    let cache = Arc::new(TokenCache::new(fetcher));

    if args.once {
        let token = cache.get_token().await?;
        println!("{}", token);
        return Ok(());
    }

    // -------------------------------
    // 3. Warm up the cache, the server keeps fetching lazily on failure
    // -------------------------------

    let retry = RetrySettings::from_config(service_config.settings.retry.as_ref());
    if let Err(e) = retry.run_with_retry(|| cache.get_token()).await {
        warn!(error = %e, "cache warm-up failed, token will be fetched on first request");
    }

    // -------------------------------
    // 4. Serve token and metrics
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, cache).await
}
