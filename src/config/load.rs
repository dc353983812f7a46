//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies env overrides collected in [`EnvOverrides`].

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::{self, RawConfig};
use super::types::*;

/// Deep-merge two TOML values.
/// Tables are merged recursively — the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Environment overrides applied on top of the TOML file.
///
/// Collected once in [`EnvOverrides::from_env`] so the loader itself never
/// touches the process environment — tests pass a struct instead of
/// mutating env vars.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    /// `DINHGIA_LOG_LEVEL`
    pub log_level: Option<String>,
    /// `DINHGIA_BIND`
    pub bind: Option<String>,
    /// `NEXT_PUBLIC_GULAND_SERVER_URL` — shared with the web front-end `.env`.
    pub upstream_base_url: Option<String>,
    /// `PROXY_SERVER_URL`
    pub proxy_base_url: Option<String>,
    /// `PROXY_SERVER_API_KEY`
    pub proxy_api_key: Option<String>,
    /// `PERPLEXITY_API_KEY`
    pub perplexity_api_key: Option<String>,
}

impl EnvOverrides {
    /// Snapshot the recognised env vars.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("DINHGIA_LOG_LEVEL").ok(),
            bind: env::var("DINHGIA_BIND").ok(),
            upstream_base_url: env::var("NEXT_PUBLIC_GULAND_SERVER_URL").ok(),
            proxy_base_url: env::var("PROXY_SERVER_URL").ok(),
            proxy_api_key: env::var("PROXY_SERVER_API_KEY").ok(),
            perplexity_api_key: env::var("PERPLEXITY_API_KEY").ok(),
        }
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, returns a hardcoded minimal default.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        // Hardcoded minimal default
        Ok(Config {
            service_name: "dinhgia-gateway".to_string(),
            log_level: overrides.log_level.unwrap_or_else(|| "info".to_string()),
            server: ServerConfig {
                bind: overrides.bind.unwrap_or_else(raw::default_bind),
            },
            upstream: UpstreamConfig {
                base_url: overrides
                    .upstream_base_url
                    .unwrap_or_else(raw::default_upstream_base_url),
                timeout_seconds: raw::default_upstream_timeout_seconds(),
            },
            search: SearchConfig {
                prompts_dir: PathBuf::from(raw::default_prompts_dir()),
                max_tokens: raw::default_max_tokens(),
                temperature: raw::default_temperature(),
                proxy: ProxyProviderConfig {
                    enabled: true,
                    api_base_url: overrides.proxy_base_url.unwrap_or_default(),
                    model: raw::default_proxy_model(),
                    timeout_seconds: raw::default_provider_timeout_seconds(),
                    api_key: overrides.proxy_api_key,
                },
                perplexity: PerplexityProviderConfig {
                    enabled: true,
                    api_base_url: raw::default_perplexity_api_base_url(),
                    model: raw::default_perplexity_model(),
                    timeout_seconds: raw::default_provider_timeout_seconds(),
                    api_key: overrides.perplexity_api_key,
                },
            },
        })
    }
}

/// Internal loader — accepts an explicit path and the override set.
/// Tests pass overrides directly instead of mutating env vars.
/// Follows `[meta] base = "..."` inheritance chains before resolving.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val)
        .map_err(|e: toml::de::Error| {
            AppError::Config(format!("config error in {}: {e}", path.display()))
        })?;

    let log_level = overrides
        .log_level
        .as_deref()
        .unwrap_or(&parsed.service.log_level)
        .to_string();
    let bind = overrides
        .bind
        .as_deref()
        .unwrap_or(&parsed.server.bind)
        .to_string();
    let upstream_base_url = overrides
        .upstream_base_url
        .as_deref()
        .unwrap_or(&parsed.upstream.base_url)
        .trim_end_matches('/')
        .to_string();
    let proxy_base_url = overrides
        .proxy_base_url
        .as_deref()
        .unwrap_or(&parsed.search.proxy.api_base_url)
        .to_string();

    Ok(Config {
        service_name: parsed.service.name,
        log_level,
        server: ServerConfig { bind },
        upstream: UpstreamConfig {
            base_url: upstream_base_url,
            timeout_seconds: parsed.upstream.timeout_seconds,
        },
        search: SearchConfig {
            prompts_dir: PathBuf::from(parsed.search.prompts_dir),
            max_tokens: parsed.search.max_tokens,
            temperature: parsed.search.temperature,
            proxy: ProxyProviderConfig {
                enabled: parsed.search.proxy.enabled,
                api_base_url: proxy_base_url,
                model: parsed.search.proxy.model,
                timeout_seconds: parsed.search.proxy.timeout_seconds,
                api_key: overrides.proxy_api_key.clone(),
            },
            perplexity: PerplexityProviderConfig {
                enabled: parsed.search.perplexity.enabled,
                api_base_url: parsed.search.perplexity.api_base_url,
                model: parsed.search.perplexity.model,
                timeout_seconds: parsed.search.perplexity.timeout_seconds,
                api_key: overrides.perplexity_api_key.clone(),
            },
        },
    })
}
