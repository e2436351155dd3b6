//! 类型系统模块：请求与响应的数据模型。
//!
//! # Types Module
//!
//! Request and response bodies for the endpoints this client exposes. Only the
//! fields callers commonly need are modelled; unknown response fields are ignored.
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`message`] | Chat request messages and the string-or-parts content union |
//! | [`chat`] | Chat completions options and results |
//! | [`completions`] | Legacy text completions |
//! | [`embeddings`] | Embeddings |
//! | [`images`] | Image generation |
//! | [`envelope`] | Streaming wrapper that injects `stream` into any body |
//! | [`content_filter`] | Content filter annotations |
//!
//! ## Example
//!
//! ```rust
//! use aoai_client::types::{ChatCompletionsOptions, ChatRequestMessage, ContentPart};
//!
//! let opts = ChatCompletionsOptions::new(
//!     "gpt-4o",
//!     vec![
//!         ChatRequestMessage::system("You are a helpful assistant"),
//!         ChatRequestMessage::user(vec![
//!             ContentPart::text("What is in this image?"),
//!             ContentPart::image_url("https://example.com/cat.png"),
//!         ]),
//!     ],
//! );
//! assert_eq!(opts.deployment_name.as_deref(), Some("gpt-4o"));
//! ```

pub mod chat;
pub mod completions;
pub mod content_filter;
pub mod embeddings;
pub mod envelope;
pub mod images;
pub mod message;

pub use chat::{ChatChoice, ChatCompletions, ChatCompletionsOptions, ChatResponseMessage};
pub use completions::{Completions, CompletionsOptions};
pub use content_filter::{ContentFilterResult, ContentFilterResults};
pub use embeddings::{Embeddings, EmbeddingsOptions};
pub use envelope::{StreamOptions, StreamingRequest};
pub use images::{ImageGenerationOptions, ImageGenerations};
pub use message::{ChatRequestMessage, ContentPart, ImageDetail, ImageUrl, UserMessageContent};

use serde::{Deserialize, Serialize};

/// Request bodies that may name the deployment they target.
///
/// The client routes managed-cloud requests with this; vendor-direct ignores it for URLs.
pub trait DeploymentScoped {
    fn deployment_name(&self) -> Option<&str>;
}

/// Token accounting reported by completions and chat completions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionsUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
