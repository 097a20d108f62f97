// Business domains: content acquisition (crawl jobs, extraction) and chat
pub mod chat;
pub mod content;
pub mod crawling;
