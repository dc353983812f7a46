//! Market-search completion providers.
//!
//! Two concrete providers, no trait object: the orchestrator in
//! [`crate::search`] holds each one as an `Option` and drives the
//! primary → fallback cascade itself. Wire types shared by both live in
//! `wire`; response parsing differs per provider and stays private to
//! each module.

mod perplexity;
mod proxy;
mod wire;

pub use perplexity::PerplexityProvider;
pub use proxy::ProxyServerProvider;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider request timed out after {0}s")]
    Timeout(u64),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

// ── Provider identity ─────────────────────────────────────────────────────────

/// Which provider produced a search answer.
///
/// Used for report labels and the `provider` field of API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    ProxyServer,
    Perplexity,
}

impl ProviderKind {
    /// Human-readable label used inside rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::ProxyServer => "Proxy Server",
            ProviderKind::Perplexity => "Perplexity",
        }
    }

    /// Stable machine tag used in API payloads.
    pub fn tag(self) -> &'static str {
        match self {
            ProviderKind::ProxyServer => "proxy",
            ProviderKind::Perplexity => "perplexity",
        }
    }
}

/// A provider answer plus a flag for content recovered from a lenient shape.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub content: String,
    /// `true` when the content came from a non-standard response shape.
    pub partial: bool,
}
