//! Content acquisition: turning a URL into the text a chat is grounded on.
//!
//! Two strategies sit behind `BaseContentSource`: an asynchronous crawl job
//! (submit, poll, read first result) and a synchronous extraction call.

pub mod error;
pub mod models;
pub mod sources;

pub use error::{ContentError, ContentResult};
pub use models::{ContentPayload, ContentStrategy};
pub use sources::{CrawlContentSource, ExtractionContentSource};
