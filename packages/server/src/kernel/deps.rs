//! Server dependencies (using traits for testability)
//!
//! Built once at startup from `Config`; handlers share it through an `Arc`.
//! Every external service sits behind a `Base*` trait so tests can swap in
//! the mocks from `test_dependencies`.

use std::sync::Arc;

use anyhow::{Context, Result};
use firecrawl_client::FirecrawlClient;
use openai_client::OpenAIClient;
use tracing::info;

use crate::config::Config;
use crate::domains::chat::ChatOptions;
use crate::domains::content::{ContentStrategy, CrawlContentSource, ExtractionContentSource};
use crate::domains::crawling::{JobPoller, PollOptions};
use crate::kernel::{
    BaseCompletionBackend, BaseContentSource, BaseCrawlApi, ExtractionClient,
    OpenAICompletionBackend,
};

#[derive(Clone)]
pub struct ServerDeps {
    /// Raw crawl API for the submit/status endpoints. `None` when the
    /// deployment uses the extraction strategy.
    pub crawl_api: Option<Arc<dyn BaseCrawlApi>>,
    /// The one active content strategy
    pub content_source: Arc<dyn BaseContentSource>,
    pub completion: Arc<dyn BaseCompletionBackend>,
    pub poll_options: PollOptions,
    pub chat_options: ChatOptions,
}

impl ServerDeps {
    pub fn new(
        crawl_api: Option<Arc<dyn BaseCrawlApi>>,
        content_source: Arc<dyn BaseContentSource>,
        completion: Arc<dyn BaseCompletionBackend>,
    ) -> Self {
        Self {
            crawl_api,
            content_source,
            completion,
            poll_options: PollOptions::default(),
            chat_options: ChatOptions::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let poll_options = config.poll_options();

        let (crawl_api, content_source): (Option<Arc<dyn BaseCrawlApi>>, Arc<dyn BaseContentSource>) =
            match config.content_strategy {
                ContentStrategy::Crawl => {
                    let key = config
                        .firecrawl_api_key
                        .as_ref()
                        .context("FIRECRAWL_API_KEY must be set when CONTENT_STRATEGY is crawl")?;
                    let api: Arc<dyn BaseCrawlApi> = Arc::new(
                        FirecrawlClient::new(key.expose().to_string())
                            .with_base_url(&config.firecrawl_base_url),
                    );
                    let poller = JobPoller::new(api.clone(), poll_options.clone());
                    let source: Arc<dyn BaseContentSource> = Arc::new(CrawlContentSource::new(poller));
                    (Some(api), source)
                }
                ContentStrategy::Extract => {
                    let client = ExtractionClient::new(config.extraction_api_key.clone())
                        .with_base_url(&config.extraction_base_url)
                        .with_max_bytes(config.max_extraction_bytes);
                    let source: Arc<dyn BaseContentSource> = Arc::new(ExtractionContentSource::new(client));
                    (None, source)
                }
            };

        let completion = OpenAICompletionBackend::new(
            OpenAIClient::new(config.completion_api_key.expose())
                .with_base_url(&config.completion_base_url),
            &config.completion_model,
        );

        info!(
            strategy = %config.content_strategy,
            model = %config.completion_model,
            "Server dependencies initialized"
        );

        Ok(Self {
            crawl_api,
            content_source,
            completion: Arc::new(completion),
            poll_options,
            chat_options: config.chat_options(),
        })
    }

    /// Poller for the raw crawl endpoints, when the crawl strategy is active
    pub fn job_poller(&self) -> Option<JobPoller> {
        self.crawl_api
            .as_ref()
            .map(|api| JobPoller::new(api.clone(), self.poll_options.clone()))
    }
}
