//! Context-gated chat: a transcript headed by one system turn that embeds the
//! acquired page content, answered by a streaming completion backend.

pub mod error;
pub mod models;
pub mod prompts;
pub mod relay;
pub mod session;

pub use error::{ChatError, ChatResult};
pub use models::{ChatRole, ChatTurn};
pub use prompts::{build_system_prompt, REFUSAL_MESSAGE};
pub use relay::{relay, RelayEvent};
pub use session::{Answer, ChatOptions, ChatSession, DecodingParams};
