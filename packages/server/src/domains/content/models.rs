use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extracted text of one page. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    text: String,
    source_url: String,
}

impl ContentPayload {
    pub fn new(text: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
        }
    }

    /// A payload with no answerable context (crawl completed without results).
    pub fn empty(source_url: impl Into<String>) -> Self {
        Self::new(String::new(), source_url)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// True when there is nothing a chat could be grounded on.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Which content source is active for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStrategy {
    /// Submit an asynchronous crawl job and poll it.
    #[default]
    Crawl,
    /// One synchronous call to the extraction proxy.
    Extract,
}

impl fmt::Display for ContentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStrategy::Crawl => write!(f, "crawl"),
            ContentStrategy::Extract => write!(f, "extract"),
        }
    }
}

impl FromStr for ContentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crawl" => Ok(ContentStrategy::Crawl),
            "extract" | "extraction" => Ok(ContentStrategy::Extract),
            other => Err(format!(
                "unknown content strategy '{}' (expected 'crawl' or 'extract')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_payload_is_empty() {
        assert!(ContentPayload::empty("https://a.dev").is_empty());
        assert!(ContentPayload::new(" \n\t", "https://a.dev").is_empty());
        assert!(!ContentPayload::new("Paris", "https://a.dev").is_empty());
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("CRAWL".parse::<ContentStrategy>(), Ok(ContentStrategy::Crawl));
        assert_eq!(" extract ".parse::<ContentStrategy>(), Ok(ContentStrategy::Extract));
        assert!("scrape".parse::<ContentStrategy>().is_err());
        assert_eq!(ContentStrategy::Extract.to_string(), "extract");
    }
}
