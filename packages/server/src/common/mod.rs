// Shared helpers used across domains
pub mod secret;
pub mod urls;

pub use secret::ApiKey;
pub use urls::{normalize_url, validate_url};
