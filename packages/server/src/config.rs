use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::common::ApiKey;
use crate::domains::chat::ChatOptions;
use crate::domains::content::ContentStrategy;
use crate::domains::crawling::PollOptions;
use crate::kernel::completion::{DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL};
use crate::kernel::extraction_client::{DEFAULT_EXTRACTION_BASE_URL, DEFAULT_MAX_EXTRACTION_BYTES};

pub const DEFAULT_FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub content_strategy: ContentStrategy,
    pub firecrawl_api_key: Option<ApiKey>,
    pub firecrawl_base_url: String,
    pub extraction_api_key: Option<ApiKey>,
    pub extraction_base_url: String,
    pub completion_api_key: ApiKey,
    pub completion_base_url: String,
    pub completion_model: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub poll_max_attempts: Option<u32>,
    pub max_context_bytes: usize,
    pub max_extraction_bytes: u64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let content_strategy = match get("CONTENT_STRATEGY") {
            Some(raw) => ContentStrategy::from_str(&raw)
                .map_err(anyhow::Error::msg)
                .context("CONTENT_STRATEGY is invalid")?,
            None => ContentStrategy::default(),
        };

        let firecrawl_api_key = get("FIRECRAWL_API_KEY").map(ApiKey::from);
        if content_strategy == ContentStrategy::Crawl && firecrawl_api_key.is_none() {
            bail!("FIRECRAWL_API_KEY must be set when CONTENT_STRATEGY is crawl");
        }

        let poll_interval_secs: u64 = parse_or(&get, "POLL_INTERVAL_SECS", 5)?;
        if poll_interval_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            port: parse_or(&get, "PORT", 8080)?,
            content_strategy,
            firecrawl_api_key,
            firecrawl_base_url: get("FIRECRAWL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRECRAWL_BASE_URL.to_string()),
            extraction_api_key: get("EXTRACTION_API_KEY").map(ApiKey::from),
            extraction_base_url: get("EXTRACTION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_BASE_URL.to_string()),
            completion_api_key: get("COMPLETION_API_KEY")
                .map(ApiKey::from)
                .context("COMPLETION_API_KEY must be set")?,
            completion_base_url: get("COMPLETION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            completion_model: get("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            poll_interval_secs,
            poll_timeout_secs: parse_or(&get, "POLL_TIMEOUT_SECS", 300)?,
            poll_max_attempts: get("POLL_MAX_ATTEMPTS")
                .map(|v| v.trim().parse())
                .transpose()
                .context("POLL_MAX_ATTEMPTS must be a valid number")?,
            max_context_bytes: parse_or(&get, "MAX_CONTEXT_BYTES", 200_000)?,
            max_extraction_bytes: parse_or(&get, "MAX_EXTRACTION_BYTES", DEFAULT_MAX_EXTRACTION_BYTES)?,
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Some(Duration::from_secs(self.poll_timeout_secs)),
            max_attempts: self.poll_max_attempts,
        }
    }

    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions {
            max_context_bytes: self.max_context_bytes,
            ..ChatOptions::default()
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("FIRECRAWL_API_KEY", "fc-key"), ("COMPLETION_API_KEY", "llm-key")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.content_strategy, ContentStrategy::Crawl);
        assert_eq!(config.firecrawl_base_url, "https://api.firecrawl.dev");
        assert_eq!(config.extraction_base_url, "https://r.jina.ai");
        assert_eq!(config.completion_model, "gemini-1.5-flash-latest");
        assert_eq!(config.poll_options(), PollOptions::default());
        assert_eq!(config.chat_options(), ChatOptions::default());
        assert_eq!(config.max_extraction_bytes, 5 * 1024 * 1024);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn crawl_strategy_requires_firecrawl_key() {
        let err = config(&[("COMPLETION_API_KEY", "llm-key")]).unwrap_err();
        assert!(err.to_string().contains("FIRECRAWL_API_KEY"));

        let config = config(&[("CONTENT_STRATEGY", "extract"), ("COMPLETION_API_KEY", "llm-key")]).unwrap();
        assert_eq!(config.content_strategy, ContentStrategy::Extract);
        assert!(config.firecrawl_api_key.is_none());
    }

    #[test]
    fn completion_key_is_required() {
        let err = config(&[("FIRECRAWL_API_KEY", "fc-key")]).unwrap_err();
        assert!(err.to_string().contains("COMPLETION_API_KEY"));
    }

    #[test]
    fn overrides_and_origins() {
        let config = config(&[
            ("CONTENT_STRATEGY", "extract"),
            ("COMPLETION_API_KEY", "llm-key"),
            ("PORT", "3001"),
            ("POLL_INTERVAL_SECS", "2"),
            ("POLL_MAX_ATTEMPTS", "10"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, https://webscribe.app"),
        ])
        .unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.poll_options().interval, Duration::from_secs(2));
        assert_eq!(config.poll_options().max_attempts, Some(10));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "https://webscribe.app"]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("CONTENT_STRATEGY", "scrape"), ("COMPLETION_API_KEY", "k")]).is_err());
        assert!(config(&[
            ("CONTENT_STRATEGY", "extract"),
            ("COMPLETION_API_KEY", "k"),
            ("PORT", "eighty")
        ])
        .is_err());
        assert!(config(&[
            ("CONTENT_STRATEGY", "extract"),
            ("COMPLETION_API_KEY", "k"),
            ("POLL_INTERVAL_SECS", "0")
        ])
        .is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = config(&[("FIRECRAWL_API_KEY", "fc-secret"), ("COMPLETION_API_KEY", "llm-secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("fc-secret"));
        assert!(!debug.contains("llm-secret"));
    }
}
