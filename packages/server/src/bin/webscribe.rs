//! Terminal chat over one web page.
//!
//! Acquires the page with the configured content strategy, then answers
//! questions from stdin, streaming each answer as it arrives. One session
//! lives for the whole process, so follow-up questions see earlier turns.
//!
//! Commands: `/url <address>` loads another page into the same session,
//! `/quit` exits. Ctrl-C cancels a running acquisition or answer.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webscribe_core::domains::chat::{ChatError, ChatSession};
use webscribe_core::domains::content::{ContentError, ContentStrategy};
use webscribe_core::kernel::{BaseContentSource, ServerDeps};
use webscribe_core::Config;

#[derive(Parser)]
#[command(name = "webscribe")]
#[command(about = "Ask questions about a web page, answered from its content only")]
struct Cli {
    /// Page to load (scheme optional)
    url: String,

    /// Content strategy, overrides CONTENT_STRATEGY
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<ContentStrategy>,
}

fn parse_strategy(raw: &str) -> Result<ContentStrategy, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,webscribe_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let _ = dotenvy::dotenv();
    let strategy = cli.strategy.map(|s| s.to_string());
    let config = Config::from_lookup(|key| match (key, &strategy) {
        ("CONTENT_STRATEGY", Some(s)) => Some(s.clone()),
        _ => std::env::var(key).ok(),
    })
    .context("Failed to load configuration")?;

    let deps = ServerDeps::from_config(&config).context("Failed to build dependencies")?;
    let mut session = ChatSession::new(deps.chat_options.clone());

    load_page(deps.content_source.as_ref(), &mut session, &cli.url).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        match Command::parse(line) {
            Some(Command::Quit) => break,
            Some(Command::LoadUrl(url)) => {
                if let Err(e) = load_page(deps.content_source.as_ref(), &mut session, url).await {
                    eprintln!("{:#}", e);
                }
                continue;
            }
            Some(Command::Usage) => {
                eprintln!("usage: /url <address>");
                continue;
            }
            None => {}
        }

        if let Err(e) = answer(&deps, &mut session, line).await {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

/// Fetch `url` and make it the session's content. Ctrl-C cancels.
async fn load_page(source: &dyn BaseContentSource, session: &mut ChatSession, url: &str) -> Result<()> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    eprintln!("Fetching {} ({})...", url, source.strategy());
    let result = source.fetch_content(url, &cancel).await;
    watcher.abort();

    let payload = match result {
        Ok(payload) => payload,
        Err(ContentError::Cancelled) => {
            eprintln!("Cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to load {}", url)),
    };

    if payload.is_empty() {
        eprintln!("The page returned no content; questions cannot be answered yet.");
    } else {
        eprintln!("Loaded {} bytes from {}.", payload.len(), payload.source_url());
    }
    session.set_content(payload);
    Ok(())
}

/// Ask one question and print the answer as it streams.
async fn answer(deps: &ServerDeps, session: &mut ChatSession, question: &str) -> Result<(), ChatError> {
    let mut answer = session.ask(deps.completion.as_ref(), question).await?;

    loop {
        let chunk = tokio::select! {
            chunk = answer.next() => chunk,
            _ = tokio::signal::ctrl_c() => {
                println!();
                eprintln!("Interrupted.");
                return Ok(());
            }
        };

        match chunk {
            Some(Ok(text)) => {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
            Some(Err(e)) => {
                println!();
                return Err(e);
            }
            None => break,
        }
    }

    println!();
    Ok(())
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush().context("Failed to write prompt")
}

/// REPL commands. Anything else is a question.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Quit,
    LoadUrl(&'a str),
    Usage,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        match name {
            "/quit" => Some(Command::Quit),
            "/url" if arg.is_empty() => Some(Command::Usage),
            "/url" => Some(Command::LoadUrl(arg)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_command_takes_separated_argument() {
        assert_eq!(
            Command::parse("/url   example.com/about "),
            Some(Command::LoadUrl("example.com/about"))
        );
        assert_eq!(Command::parse("/url"), Some(Command::Usage));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
    }

    #[test]
    fn command_name_must_match_whole_word() {
        assert_eq!(Command::parse("/urlexample.com"), None);
        assert_eq!(Command::parse("/quitting now"), None);
        assert_eq!(Command::parse("What is /url for?"), None);
    }
}
