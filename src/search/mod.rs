//! AI market search with provider fallback.
//!
//! [`MarketSearch`] tries the proxy server first, then Perplexity, and
//! keeps any partial (lenient-shape) answer from the primary as a last
//! resort. Total failure is not an error — the report comes back empty and
//! the caller decides what to show.

pub mod prompt;
pub mod providers;
pub mod report;
mod templates;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::SearchConfig;

use prompt::SearchQuery;
use providers::{
    PerplexityProvider, ProviderError, ProviderKind, ProviderReply, ProxyServerProvider,
};

/// Snapshot of which providers are usable, for health reporting.
#[derive(Debug, Clone, Copy)]
pub struct ProviderStatus {
    pub proxy: bool,
    pub perplexity: bool,
}

/// Finished search result.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Rendered report text; empty when every provider failed.
    pub text: String,
    /// Provider that produced the content, if any.
    pub provider: Option<ProviderKind>,
    /// Content came from a lenient-shape reply.
    pub partial: bool,
}

impl SearchReport {
    fn empty() -> Self {
        Self {
            text: String::new(),
            provider: None,
            partial: false,
        }
    }
}

/// Market-search orchestrator.
pub struct MarketSearch {
    proxy: Option<ProxyServerProvider>,
    perplexity: Option<PerplexityProvider>,
    prompts_dir: PathBuf,
}

impl MarketSearch {
    /// Build a provider for everything `available()` in the config.
    ///
    /// An unavailable provider is simply absent — construction only fails
    /// when an available provider cannot build its HTTP client.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ProviderError> {
        let proxy = if config.proxy.available() {
            Some(ProxyServerProvider::new(
                &config.proxy,
                config.max_tokens,
                config.temperature,
            )?)
        } else {
            None
        };
        let perplexity = if config.perplexity.available() {
            Some(PerplexityProvider::new(
                &config.perplexity,
                config.max_tokens,
                config.temperature,
            )?)
        } else {
            None
        };
        Ok(Self {
            proxy,
            perplexity,
            prompts_dir: config.prompts_dir.clone(),
        })
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            proxy: self.proxy.is_some(),
            perplexity: self.perplexity.is_some(),
        }
    }

    /// Run one search. Never errors: provider failures degrade through the
    /// fallback chain and end at an empty report.
    pub async fn search(&self, query: &SearchQuery) -> SearchReport {
        let status = self.provider_status();
        info!(
            location = %query.location,
            proxy = status.proxy,
            perplexity = status.perplexity,
            "market search requested"
        );

        let system = prompt::system_prompt(&self.prompts_dir);
        let user = prompt::build_user_prompt(query);
        debug!(prompt_chars = user.chars().count(), "search prompt prepared");

        let mut held: Option<ProviderReply> = None;

        if let Some(proxy) = &self.proxy {
            info!("trying primary provider: proxy server");
            match proxy.complete(&system, &user).await {
                Ok(reply) if !reply.partial => {
                    return self.finish(query, &reply.content, ProviderKind::ProxyServer, false);
                }
                Ok(reply) => {
                    warn!("proxy answer came from a lenient shape — holding as partial");
                    held = Some(reply);
                }
                Err(e) => warn!(error = %e, "proxy server failed — trying fallback"),
            }
        } else {
            info!("proxy server not available — considering fallback");
        }

        if let Some(perplexity) = &self.perplexity {
            info!("trying fallback provider: perplexity");
            match perplexity.complete(&system, &user).await {
                Ok(content) => {
                    return self.finish(query, &content, ProviderKind::Perplexity, false);
                }
                Err(e) => warn!(error = %e, "perplexity failed as fallback"),
            }
        } else {
            info!("no fallback provider available");
        }

        if let Some(reply) = held {
            info!("using partial data from the primary provider as last resort");
            return self.finish(query, &reply.content, ProviderKind::ProxyServer, true);
        }

        warn!("all search providers failed or were unavailable — returning empty report");
        SearchReport::empty()
    }

    fn finish(
        &self,
        query: &SearchQuery,
        content: &str,
        provider: ProviderKind,
        partial: bool,
    ) -> SearchReport {
        let text = report::render(
            content,
            &query.location,
            query.parsed_address.as_ref(),
            provider,
            &self.prompts_dir,
        );
        info!(
            provider = provider.tag(),
            partial,
            report_chars = text.chars().count(),
            "market search finished"
        );
        SearchReport {
            text,
            provider: Some(provider),
            partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn unavailable_providers_are_absent() {
        let search = MarketSearch::from_config(&Config::test_default().search).unwrap();
        let status = search.provider_status();
        assert!(!status.proxy);
        assert!(!status.perplexity);
    }

    #[tokio::test]
    async fn no_providers_yields_empty_report() {
        let search = MarketSearch::from_config(&Config::test_default().search).unwrap();
        let report = search.search(&SearchQuery::default()).await;
        assert!(report.text.is_empty());
        assert!(report.provider.is_none());
        assert!(!report.partial);
    }
}
