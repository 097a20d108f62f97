// HTTP routes
pub mod chat;
pub mod content;
pub mod crawl;
pub mod health;

pub use chat::*;
pub use content::*;
pub use crawl::*;
pub use health::*;
