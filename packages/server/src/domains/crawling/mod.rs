//! Asynchronous crawl jobs: submission and bounded status polling.

pub mod job;
pub mod poller;

pub use job::{CrawlJob, CrawlScope, JobStatus};
pub use poller::{JobPoller, PollOptions};
