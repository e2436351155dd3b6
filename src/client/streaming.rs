//! Streaming operations.
//!
//! The request body is wrapped with `stream: true` and the response body is handed to an
//! [`EventStream`] unread. Retries cover the dispatch only; once the stream is returned
//! the caller owns the connection.

use crate::client::core::Client;
use crate::context::CallContext;
use crate::streaming::{DecoderOptions, EventStream};
use crate::types::{
    ChatCompletions, ChatCompletionsOptions, Completions, CompletionsOptions, DeploymentScoped,
    StreamOptions, StreamingRequest,
};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Per-call knobs for streaming operations.
#[derive(Debug, Clone, Default)]
pub struct StreamCallOptions {
    /// Sent as `stream_options`; `None` omits the key.
    pub stream_options: Option<StreamOptions>,
    /// Cancellation and deadline, observed during dispatch and on every pull.
    pub context: CallContext,
}

impl StreamCallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a trailing usage-only chunk.
    pub fn include_usage(mut self, include: bool) -> Self {
        self.stream_options = Some(StreamOptions {
            include_usage: include,
        });
        self
    }

    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }
}

impl Client {
    pub async fn get_completions_stream(
        &self,
        options: &CompletionsOptions,
        call: StreamCallOptions,
    ) -> Result<EventStream<Completions>> {
        self.open_stream("completions", options.deployment_name(), options, call)
            .await
    }

    pub async fn get_chat_completions_stream(
        &self,
        options: &ChatCompletionsOptions,
        call: StreamCallOptions,
    ) -> Result<EventStream<ChatCompletions>> {
        self.open_stream("chat/completions", options.deployment_name(), options, call)
            .await
    }

    async fn open_stream<B, T>(
        &self,
        path: &str,
        deployment: Option<&str>,
        body: &B,
        call: StreamCallOptions,
    ) -> Result<EventStream<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let started = Instant::now();
        let envelope = StreamingRequest::new(body).with_stream_options(call.stream_options);
        let mut request = self.new_request(path, deployment, &envelope.to_value()?)?;
        request.set_header("accept", "text/event-stream")?;
        request.skip_body_download();

        let resp = call
            .context
            .run(self.inner.pipeline.send(&request))
            .await?;
        if resp.status() != 200 {
            // The error body is still read under the caller's context.
            let failed = call
                .context
                .run(async { Ok(self.fail(resp, &request, started).await) })
                .await;
            return Err(failed.unwrap_or_else(|cancelled| cancelled));
        }

        debug!(
            path = request.url.path(),
            ttfb_ms = started.elapsed().as_millis() as u64,
            "event stream opened"
        );
        Ok(EventStream::new(
            resp.into_byte_stream(),
            DecoderOptions {
                strict: self.inner.strict_streaming,
                context: call.context,
            },
        ))
    }
}
