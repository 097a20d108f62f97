//! Kernel module - server infrastructure and dependencies.

pub mod completion;
pub mod crawl_api;
pub mod deps;
pub mod extraction_client;
pub mod test_dependencies;
pub mod traits;

pub use completion::OpenAICompletionBackend;
pub use deps::ServerDeps;
pub use extraction_client::ExtractionClient;
pub use test_dependencies::{MockCompletionBackend, MockContentSource, MockCrawlApi, ScriptedReply};
pub use traits::*;
