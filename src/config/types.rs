//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the rest of the gateway
//! consumes. Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── Server ───────────────────────────────────────────────────────────────────

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the axum listener to.
    pub bind: String,
}

// ── Upstream ─────────────────────────────────────────────────────────────────

/// Guland map-service upstream configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the FastAPI map-service (no trailing slash required).
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

// ── Search providers ─────────────────────────────────────────────────────────

/// Primary market-search provider — an OpenAI-compatible proxy endpoint.
/// Populated from `[search.proxy]` in the TOML.
#[derive(Debug, Clone)]
pub struct ProxyProviderConfig {
    /// Whether the provider may be used at all.
    pub enabled: bool,
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// API key from `PROXY_SERVER_API_KEY` env var — never sourced from TOML.
    pub api_key: Option<String>,
}

impl ProxyProviderConfig {
    /// Returns `true` when the provider is enabled and fully configured.
    pub fn available(&self) -> bool {
        self.enabled
            && !self.api_base_url.is_empty()
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Fallback market-search provider — the Perplexity chat completions API.
/// Populated from `[search.perplexity]` in the TOML.
#[derive(Debug, Clone)]
pub struct PerplexityProviderConfig {
    /// Whether the provider may be used at all.
    pub enabled: bool,
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// API key from `PERPLEXITY_API_KEY` env var — never sourced from TOML.
    pub api_key: Option<String>,
}

impl PerplexityProviderConfig {
    /// Returns `true` when the provider is enabled and fully configured.
    pub fn available(&self) -> bool {
        self.enabled
            && !self.api_base_url.is_empty()
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Market-search configuration shared across providers.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Directory holding prompt/report template files.
    pub prompts_dir: PathBuf,
    /// Maximum output tokens per completion request.
    pub max_tokens: u32,
    /// Sampling temperature for completion requests.
    pub temperature: f32,
    /// Primary provider (`[search.proxy]`).
    pub proxy: ProxyProviderConfig,
    /// Fallback provider (`[search.perplexity]`).
    pub perplexity: PerplexityProviderConfig,
}

// ── Config (root) ────────────────────────────────────────────────────────────

/// Fully-resolved gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub search: SearchConfig,
}
