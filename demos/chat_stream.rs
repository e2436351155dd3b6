//! Streaming chat against either backend.
//!
//! Prerequisites:
//! - Managed-cloud: set `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY` and `AZURE_OPENAI_DEPLOYMENT`
//! - Vendor-direct: set `OPENAI_API_KEY` (optionally `OPENAI_MODEL`)
//!
//! Run:
//!   RUST_LOG=aoai_client=debug OPENAI_API_KEY=sk-... cargo run --example chat_stream

use anyhow::Context;
use aoai_client::types::{ChatCompletionsOptions, ChatRequestMessage};
use aoai_client::{ClientBuilder, StreamCallOptions};
use futures::StreamExt;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (builder, deployment) = match std::env::var("AZURE_OPENAI_ENDPOINT") {
        Ok(endpoint) => (
            ClientBuilder::managed_cloud(endpoint)
                .key_credential(std::env::var("AZURE_OPENAI_API_KEY").context("AZURE_OPENAI_API_KEY is not set")?),
            std::env::var("AZURE_OPENAI_DEPLOYMENT").context("AZURE_OPENAI_DEPLOYMENT is not set")?,
        ),
        Err(_) => (
            ClientBuilder::vendor_direct("https://api.openai.com/v1")
                .key_credential(std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?),
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        ),
    };
    let client = builder.build()?;

    let options = ChatCompletionsOptions::new(
        deployment,
        vec![
            ChatRequestMessage::system("You are a helpful assistant."),
            ChatRequestMessage::user("Say hello in one short sentence, then list two numbers."),
        ],
    )
    .temperature(0.2)
    .max_tokens(128);

    let mut stream = client
        .get_chat_completions_stream(&options, StreamCallOptions::new().include_usage(true))
        .await?;

    let mut stdout = std::io::stdout();
    while let Some(update) = stream.next().await {
        let update = update?;
        for choice in &update.choices {
            if let Some(text) = choice.delta.as_ref().and_then(|d| d.content.as_deref()) {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
        }
        if let Some(usage) = update.usage {
            println!("\n\n--- Usage ---\n{:#?}", usage);
        }
    }
    println!();

    Ok(())
}
