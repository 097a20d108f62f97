//! Streaming chat against any OpenAI-compatible endpoint.
//!
//! OPENAI_API_KEY=... OPENAI_BASE_URL=https://generativelanguage.googleapis.com/v1beta/openai \
//!     cargo run -p openai-client --example basic

use futures::StreamExt;
use openai_client::{ChatRequest, Message, OpenAIClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = OpenAIClient::from_env()?;
    if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
        client = client.with_base_url(base_url);
    }
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let mut stream = client
        .chat_completion_stream(
            ChatRequest::new(model)
                .message(Message::system("You are a helpful assistant."))
                .message(Message::user("What is Rust in one sentence?"))
                .temperature(0.7)
                .top_p(0.4)
                .max_tokens(100),
        )
        .await?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.done {
            break;
        }
        print!("{}", chunk.delta);
    }
    println!();

    Ok(())
}
