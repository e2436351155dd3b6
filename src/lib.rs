//! # aoai-client
//!
//! 面向 Azure OpenAI 与 OpenAI 两种后端的异步客户端，支持 SSE 流式响应。
//!
//! Async client for a generative-AI completion service exposed both as a managed-cloud
//! deployment (Azure OpenAI) and directly by the vendor (OpenAI).
//!
//! ## Overview
//!
//! One logical request is adapted to either wire shape by a small set of per-attempt
//! policies (credential header, `api-version` handling) and a backend-aware URL router.
//! Streaming responses are decoded incrementally from `text/event-stream` bodies into a
//! lazily produced [`EventStream`] of typed updates.
//!
//! ## Key Features
//!
//! - **Two backends**: [`ClientBuilder::managed_cloud`] and [`ClientBuilder::vendor_direct`]
//! - **Credentials**: bearer tokens from a [`credential::TokenCredential`] or a rotatable
//!   API key, refused over plain `http` unless explicitly allowed
//! - **Streaming**: chat and text completions as [`EventStream`], cancellable per pull
//!   through [`CallContext`]
//! - **Retries**: transient statuses and transport errors, honouring `Retry-After`
//! - **Structured errors**: [`ResponseError`] with service code and content-filter details
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aoai_client::types::{ChatCompletionsOptions, ChatRequestMessage};
//! use aoai_client::{ClientBuilder, StreamCallOptions};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> aoai_client::Result<()> {
//!     let client = ClientBuilder::managed_cloud("https://my-resource.openai.azure.com")
//!         .key_credential("your-api-key")
//!         .build()?;
//!
//!     let options = ChatCompletionsOptions::new(
//!         "gpt-4o",
//!         vec![ChatRequestMessage::user("Hello, how are you?")],
//!     );
//!     let mut stream = client
//!         .get_chat_completions_stream(&options, StreamCallOptions::new())
//!         .await?;
//!     while let Some(update) = stream.next().await {
//!         if let Some(text) = update?.choices.first().and_then(|c| c.delta.as_ref()).and_then(|d| d.content.as_deref()) {
//!             print!("{}", text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Builder, URL routing and operations |
//! | [`policy`] | Per-attempt request policies |
//! | [`pipeline`] | Policy execution and retries around dispatch |
//! | [`transport`] | Transport seam and the reqwest implementation |
//! | [`streaming`] | Event-stream framing and typed decoding |
//! | [`types`] | Request/response bodies and message content |
//! | [`credential`] | Token and key credentials |

pub mod client;
pub mod context;
pub mod credential;
pub mod pipeline;
pub mod policy;
pub mod streaming;
pub mod transport;
pub mod types;

pub use client::{BackendKind, BackendTarget, Client, ClientBuilder, StreamCallOptions};
pub use context::CallContext;
pub use credential::{AccessToken, KeyCredential, TokenCredential};
pub use streaming::EventStream;

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{CancelReason, Error, ErrorContext, ResponseError};
