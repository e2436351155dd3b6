use super::decode::{Frame, SseFramer};
use crate::context::CallContext;
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use futures::stream::{self, FusedStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// Decoder behaviour knobs.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    /// Treat end of body without `[DONE]` as an error instead of a clean end.
    pub strict: bool,
    pub context: CallContext,
}

enum State {
    Streaming {
        body: BoxStream<'static, Bytes>,
        framer: SseFramer,
        emitted: usize,
    },
    // Body hit EOF after the last frame was handed out.
    Eof,
    Finished,
}

/// A forward-only sequence of results decoded from a server-sent event body.
///
/// Nothing is read until the first poll. The sequence ends after `[DONE]`, after the
/// body closes, or after the first error. Dropping it closes the connection.
pub struct EventStream<T> {
    inner: stream::Fuse<BoxStream<'static, T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EventStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(body: BoxStream<'static, Bytes>, options: DecoderOptions) -> Self {
        let initial = State::Streaming {
            body,
            framer: SseFramer::new(),
            emitted: 0,
        };
        let inner = stream::unfold((initial, options), |(state, options)| async move {
            let (item, next) = step::<T>(state, &options).await?;
            Some((item, (next, options)))
        });
        let inner: BoxStream<'static, T> = Box::pin(inner);
        Self {
            inner: inner.fuse(),
            _marker: PhantomData,
        }
    }
}

impl<T> EventStream<T> {
    /// Release the underlying connection now. Equivalent to dropping.
    pub fn close(self) {}
}

impl<T> Stream for EventStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<T> FusedStream for EventStream<T> {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}

impl<T> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

fn decode_error(message: String) -> Error {
    Error::decode_with_context(message, ErrorContext::new().with_source("event_stream"))
}

fn end_of_body<T>(strict: bool) -> Option<(Result<T>, State)> {
    if strict {
        Some((
            Err(decode_error("stream ended before [DONE]".to_string())),
            State::Finished,
        ))
    } else {
        None
    }
}

/// Advance the decoder by one item. `None` ends the sequence.
async fn step<T: DeserializeOwned>(
    state: State,
    options: &DecoderOptions,
) -> Option<(Result<T>, State)> {
    let (mut body, mut framer, mut emitted) = match state {
        State::Streaming {
            body,
            framer,
            emitted,
        } => (body, framer, emitted),
        State::Eof => return end_of_body(options.strict),
        State::Finished => return None,
    };

    if let Err(e) = options.context.check() {
        return Some((Err(e), State::Finished));
    }

    loop {
        match framer.next_frame() {
            Err(e) => return Some((Err(e), State::Finished)),
            Ok(Some(Frame::Done)) => {
                debug!(frames = emitted, "event stream completed");
                return None;
            }
            Ok(Some(Frame::Data(payload))) => {
                return Some(match parse::<T>(&payload, emitted) {
                    Ok(item) => {
                        emitted += 1;
                        (
                            Ok(item),
                            State::Streaming {
                                body,
                                framer,
                                emitted,
                            },
                        )
                    }
                    Err(e) => (Err(e), State::Finished),
                });
            }
            Ok(None) => {}
        }

        let next = tokio::select! {
            biased;
            reason = options.context.done() => Err(reason),
            chunk = body.next() => Ok(chunk),
        };

        match next {
            Err(reason) => {
                debug!(frames = emitted, %reason, "event stream cancelled");
                return Some((Err(Error::Cancelled(reason)), State::Finished));
            }
            Ok(Some(Ok(bytes))) => framer.push(&bytes),
            Ok(Some(Err(e))) => return Some((Err(e), State::Finished)),
            Ok(None) => {
                drop(body);
                return match framer.finish() {
                    Err(e) => Some((Err(e), State::Finished)),
                    Ok(Some(Frame::Done)) => None,
                    Ok(Some(Frame::Data(payload))) => Some(match parse::<T>(&payload, emitted) {
                        Ok(item) => (Ok(item), State::Eof),
                        Err(e) => (Err(e), State::Finished),
                    }),
                    Ok(None) => {
                        debug!(frames = emitted, "event stream closed without [DONE]");
                        end_of_body(options.strict)
                    }
                };
            }
        }
    }
}

fn parse<T: DeserializeOwned>(payload: &str, index: usize) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| decode_error(format!("frame {} is not valid JSON: {}", index, e)))?;

    // The service reports mid-stream failures as an `error` event.
    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(decode_error(format!(
            "frame {} carries a service error: {}",
            index, message
        )));
    }

    serde_json::from_value(value).map_err(|e| {
        decode_error(format!(
            "frame {} does not match the expected shape: {}",
            index, e
        ))
    })
}
