//! dinhgia-gateway — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build the upstream client and search providers
//!   6. Spawn a Ctrl-C watcher tied to the shutdown token
//!   7. Serve the axum router until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use dinhgia_gateway::config;
use dinhgia_gateway::error::AppError;
use dinhgia_gateway::logger;
use dinhgia_gateway::mapservice::MapServiceClient;
use dinhgia_gateway::search::MarketSearch;
use dinhgia_gateway::server::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors, the file is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    // Surface config typos before the subscriber swallows them.
    logger::parse_level(&config.log_level)?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level)?;

    info!(
        service = %config.service_name,
        bind = %config.server.bind,
        upstream = %config.upstream.base_url,
        log_level = %effective_log_level,
        "config loaded"
    );

    let map =
        MapServiceClient::new(&config.upstream).map_err(|e| AppError::Upstream(e.to_string()))?;
    let search =
        MarketSearch::from_config(&config.search).map_err(|e| AppError::Config(e.to_string()))?;

    let providers = search.provider_status();
    info!(
        proxy = providers.proxy,
        perplexity = providers.perplexity,
        "search provider availability"
    );
    if !providers.proxy && !providers.perplexity {
        warn!("no search provider configured; /api/search will return empty reports");
    }

    let state = AppState {
        service: Arc::from(config.service_name.as_str()),
        map,
        search: Arc::new(search),
    };

    // Shared shutdown token: Ctrl-C cancels it, the server watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    server::serve(&config.server.bind, state, shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: dinhgia-gateway [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help            Print help");
                println!("  -f, --config <PATH>   Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv  Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier over the configured default:
    //   -v      → warn   (warnings and errors only)
    //   -vv     → info   (normal operational output)
    //   -vvv    → debug  (flow diagnostics: prompt sizes, upstream URLs)
    //   -vvvv+  → trace  (full payload dumps)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs {
        log_level,
        config_path,
    }
}
