//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `DINHGIA_*` env overrides plus the provider API keys
//! (`PROXY_SERVER_API_KEY`, `PERPLEXITY_API_KEY`) and the upstream URL
//! shared with the web front-end (`NEXT_PUBLIC_GULAND_SERVER_URL`).
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by the gateway
//!   (`Config`, `SearchConfig`, `UpstreamConfig`, etc.).
//! - **raw** — Raw TOML deserialization types (`RawConfig`, `RawSearch`, …).
//!   These mirror the file shape and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `EnvOverrides`.

mod load;
mod raw;
mod types;

pub use load::{load, load_from, EnvOverrides};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests — providers disabled, no API keys, no external calls.
    pub fn test_default() -> Self {
        Self {
            service_name: "test".into(),
            log_level: "info".into(),
            server: ServerConfig {
                bind: "127.0.0.1:0".into(),
            },
            upstream: UpstreamConfig {
                base_url: "http://localhost:0".into(),
                timeout_seconds: 1,
            },
            search: SearchConfig {
                prompts_dir: "config/prompts".into(),
                max_tokens: 500,
                temperature: 0.0,
                proxy: ProxyProviderConfig {
                    enabled: false,
                    api_base_url: String::new(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                    api_key: None,
                },
                perplexity: PerplexityProviderConfig {
                    enabled: false,
                    api_base_url: String::new(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                    api_key: None,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[service]
name = "test-gateway"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn no_overrides() -> EnvOverrides {
        EnvOverrides::default()
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        assert_eq!(cfg.service_name, "test-gateway");
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn defaults_fill_in() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert_eq!(cfg.upstream.base_url, "http://localhost:8000");
        assert_eq!(cfg.upstream.timeout_seconds, 10);
        assert_eq!(cfg.search.max_tokens, 500);
        assert_eq!(cfg.search.proxy.model, "gpt-4o-mini");
        assert!(cfg
            .search
            .perplexity
            .api_base_url
            .contains("api.perplexity.ai"));
    }

    #[test]
    fn log_level_override_wins() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            log_level: Some("debug".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn bind_override_wins() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            bind: Some("0.0.0.0:9999".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9999");
    }

    #[test]
    fn upstream_url_override_trims_trailing_slash() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            upstream_base_url: Some("http://guland.internal:8000/".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.upstream.base_url, "http://guland.internal:8000");
    }

    #[test]
    fn proxy_unavailable_without_base_url() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            proxy_api_key: Some("sk-test".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert!(cfg.search.proxy.enabled);
        assert!(!cfg.search.proxy.available());
    }

    #[test]
    fn proxy_unavailable_without_key() {
        let toml = r#"
[service]
name = "test-gateway"
log_level = "info"

[search.proxy]
api_base_url = "http://proxy.internal/v1/chat/completions"
"#;
        let f = write_toml(toml);
        let cfg = load_from(f.path(), &no_overrides()).unwrap();
        assert!(!cfg.search.proxy.available());
    }

    #[test]
    fn proxy_available_with_url_and_key() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            proxy_base_url: Some("http://proxy.internal/v1/chat/completions".into()),
            proxy_api_key: Some("sk-test".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert!(cfg.search.proxy.available());
    }

    #[test]
    fn perplexity_available_with_key_only() {
        // api_base_url has a real default, so the key is the only missing piece.
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            perplexity_api_key: Some("pplx-test".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert!(cfg.search.perplexity.available());
    }

    #[test]
    fn disabled_provider_never_available() {
        let toml = r#"
[service]
name = "test-gateway"
log_level = "info"

[search.perplexity]
enabled = false
"#;
        let f = write_toml(toml);
        let overrides = EnvOverrides {
            perplexity_api_key: Some("pplx-test".into()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert!(!cfg.search.perplexity.available());
    }

    #[test]
    fn empty_api_key_is_not_available() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = EnvOverrides {
            perplexity_api_key: Some(String::new()),
            ..EnvOverrides::default()
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert!(!cfg.search.perplexity.available());
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(
            std::path::Path::new("/nonexistent/config.toml"),
            &no_overrides(),
        );
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    const BASE_TOML: &str = r#"
[service]
name = "base-gateway"
log_level = "info"

[upstream]
base_url = "http://localhost:8000"
timeout_seconds = 10

[search.proxy]
model = "gpt-base"
timeout_seconds = 20
api_base_url = "http://proxy.internal/v1/chat/completions"
"#;

    fn write_named(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn overlay_keeps_base_fields() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[service]
log_level = "debug"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &no_overrides()).unwrap();
        assert_eq!(cfg.service_name, "base-gateway");
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn overlay_wins_scalar() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "base.toml", BASE_TOML);
        let overlay = r#"
[meta]
base = "base.toml"

[search.proxy]
model = "gpt-overlay"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let cfg = load_from(&overlay_path, &no_overrides()).unwrap();
        assert_eq!(cfg.search.proxy.model, "gpt-overlay");
        assert_eq!(cfg.search.proxy.timeout_seconds, 20);
    }

    #[test]
    fn chained_bases() {
        let dir = TempDir::new().unwrap();
        write_named(&dir, "grandbase.toml", BASE_TOML);
        let middle = r#"
[meta]
base = "grandbase.toml"

[service]
name = "middle-gateway"
"#;
        write_named(&dir, "middle.toml", middle);
        let top = r#"
[meta]
base = "middle.toml"

[service]
log_level = "warn"
"#;
        let top_path = write_named(&dir, "top.toml", top);
        let cfg = load_from(&top_path, &no_overrides()).unwrap();
        assert_eq!(cfg.service_name, "middle-gateway");
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn missing_base_errors() {
        let dir = TempDir::new().unwrap();
        let overlay = r#"
[meta]
base = "nonexistent.toml"

[service]
name = "x"
log_level = "info"
"#;
        let overlay_path = write_named(&dir, "overlay.toml", overlay);
        let result = load_from(&overlay_path, &no_overrides());
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("cannot read") || msg.contains("config error"));
    }

    #[test]
    fn cycle_detection() {
        let dir = TempDir::new().unwrap();
        let self_path = dir.path().join("self.toml");
        let content = format!(
            "[meta]\nbase = \"{}\"\n\n{BASE_TOML}",
            self_path.display()
        );
        std::fs::write(&self_path, content).unwrap();
        let result = load_from(&self_path, &no_overrides());
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("circular"));
    }
}
