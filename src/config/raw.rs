//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub service: RawService,
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub upstream: RawUpstream,
    #[serde(default)]
    pub search: RawSearch,
}

#[derive(Deserialize)]
pub(super) struct RawService {
    pub name: String,
    pub log_level: String,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawServer {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

// ── Upstream ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawUpstream {
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    #[serde(default = "default_upstream_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawUpstream {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            timeout_seconds: default_upstream_timeout_seconds(),
        }
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawSearch {
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub proxy: RawProxyProvider,
    #[serde(default)]
    pub perplexity: RawPerplexityProvider,
}

impl Default for RawSearch {
    fn default() -> Self {
        Self {
            prompts_dir: default_prompts_dir(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            proxy: RawProxyProvider::default(),
            perplexity: RawPerplexityProvider::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawProxyProvider {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// No sensible default exists — the proxy is unavailable until configured.
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "default_proxy_model")]
    pub model: String,
    #[serde(default = "default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawProxyProvider {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base_url: String::new(),
            model: default_proxy_model(),
            timeout_seconds: default_provider_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawPerplexityProvider {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_perplexity_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_perplexity_model")]
    pub model: String,
    #[serde(default = "default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawPerplexityProvider {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base_url: default_perplexity_api_base_url(),
            model: default_perplexity_model(),
            timeout_seconds: default_provider_timeout_seconds(),
        }
    }
}

// ── Default functions (used by serde) ────────────────────────────────────────

fn default_true() -> bool {
    true
}

pub(super) fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

pub(super) fn default_upstream_base_url() -> String {
    "http://localhost:8000".to_string()
}

pub(super) fn default_upstream_timeout_seconds() -> u64 {
    10
}

pub(super) fn default_prompts_dir() -> String {
    "config/prompts".to_string()
}

pub(super) fn default_max_tokens() -> u32 {
    500
}

pub(super) fn default_temperature() -> f32 {
    0.2
}

pub(super) fn default_proxy_model() -> String {
    "gpt-4o-mini".to_string()
}

pub(super) fn default_perplexity_api_base_url() -> String {
    "https://api.perplexity.ai/chat/completions".to_string()
}

pub(super) fn default_perplexity_model() -> String {
    "sonar".to_string()
}

pub(super) fn default_provider_timeout_seconds() -> u64 {
    30
}
