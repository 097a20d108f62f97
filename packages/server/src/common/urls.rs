//! URL validation and normalization for content acquisition.
//!
//! Validation happens before any upstream call so that malformed input never
//! costs a network round trip.

use url::Url;

use crate::domains::content::ContentError;

const DEFAULT_SCHEME: &str = "https://";

/// Parse `raw` and require an http(s) scheme and a non-empty host.
pub fn validate_url(raw: &str) -> Result<Url, ContentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentError::invalid_url(raw, "URL is empty"));
    }

    let parsed = Url::parse(trimmed).map_err(|e| ContentError::invalid_url(raw, e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ContentError::invalid_url(
                raw,
                format!("unsupported scheme '{}'", other),
            ))
        }
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(ContentError::invalid_url(raw, "URL has no host")),
    }
}

/// Prefix `https://` when the input carries no scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed.trim_start_matches('/'))
    }
}

/// True when `s` starts with `scheme://` (RFC 3986 scheme characters).
fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
