//! Tracing setup for the gateway.
//!
//! One global fmt subscriber writing to stderr, installed once at startup
//! after the effective level is known. Everything the gateway logs is
//! line-oriented with structured fields (provider, status, elapsed) so the
//! output stays greppable behind a process supervisor.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Build the filter for the subscriber.
///
/// With `prefer_level` the resolved level (CLI `-v` tiers or config) wins
/// and `RUST_LOG` only rescues an unparsable level string; without it,
/// `RUST_LOG` wins and `level` is the fallback. Directive syntax
/// (`dinhgia_gateway=debug,hyper=warn`) is accepted either way.
fn build_filter(level: &str, prefer_level: bool) -> Result<EnvFilter, AppError> {
    let from_level = EnvFilter::try_new(level).map_err(|e| e.to_string());
    let from_env = EnvFilter::try_from_default_env().map_err(|e| e.to_string());

    let picked = if prefer_level {
        from_level.or(from_env)
    } else {
        from_env.or(from_level)
    };

    picked.map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}

/// Install the global subscriber. Errors if called twice.
pub fn init(level: &str, prefer_level: bool) -> Result<(), AppError> {
    let filter = build_filter(level, prefer_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Validate a level string from the config before it reaches [`init`].
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
