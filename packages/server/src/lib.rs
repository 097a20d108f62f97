// WebScribe - API Core
//
// Turns a web page into the sole knowledge context of a streaming chat.
// Content is acquired through a configured strategy (asynchronous crawl job or
// synchronous extraction), then questions are answered from that content only.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
