//! Transport layer: the request/response values policies operate on, and the
//! [`Transport`] seam that actually puts them on the wire.

pub mod http;

pub use http::{HttpTransport, HttpTransportConfig};

use crate::{BoxStream, Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

/// Sends one fully prepared request. Implementations must not retry or mutate it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PipelineRequest) -> Result<HttpResponse>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no response headers within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Transport error: {0}")]
    Other(String),
}

/// An outgoing request as seen by policies. Cloned once per attempt.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    skip_body_download: bool,
}

impl PipelineRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            skip_body_download: false,
        }
    }

    /// Set a JSON body and the matching content type.
    pub fn set_json_body(&mut self, body: Vec<u8>) {
        self.headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(body));
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::validation_with_context(
                format!("invalid header name: {}", e),
                crate::ErrorContext::new().with_field_path(name.to_string()),
            )
        })?;
        let mut value = HeaderValue::from_str(value).map_err(|e| {
            Error::validation_with_context(
                format!("invalid header value: {}", e),
                crate::ErrorContext::new().with_field_path(name.to_string()),
            )
        })?;
        if name == reqwest::header::AUTHORIZATION || name.as_str() == "api-key" {
            value.set_sensitive(true);
        }
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Set `name` to `value`, replacing every existing occurrence.
    pub fn set_query_param(&mut self, name: &str, value: &str) {
        let mut pairs = self.other_query_pairs(name);
        pairs.push((name.to_string(), value.to_string()));
        self.write_query(pairs);
    }

    /// Remove every occurrence of `name`.
    pub fn remove_query_param(&mut self, name: &str) {
        let pairs = self.other_query_pairs(name);
        self.write_query(pairs);
    }

    fn other_query_pairs(&self, name: &str) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .filter(|(k, _)| k != name)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn write_query(&mut self, pairs: Vec<(String, String)>) {
        if pairs.is_empty() {
            self.url.set_query(None);
            return;
        }
        self.url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    /// Hand the body back unread so it can be consumed incrementally (event streams).
    pub fn skip_body_download(&mut self) {
        self.skip_body_download = true;
    }

    pub fn should_skip_body_download(&self) -> bool {
        self.skip_body_download
    }
}

pub enum ResponseBody {
    Buffered(Bytes),
    Streaming(BoxStream<'static, Bytes>),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Buffered(b) => write!(f, "Buffered({} bytes)", b.len()),
            ResponseBody::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

/// A response whose body is either fully downloaded or still on the wire.
///
/// Dropping a streaming response closes its connection.
#[derive(Debug)]
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub async fn into_bytes(self) -> Result<Bytes> {
        match self.body {
            ResponseBody::Buffered(b) => Ok(b),
            ResponseBody::Streaming(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                Ok(Bytes::from(chunks.concat()))
            }
        }
    }

    pub fn into_byte_stream(self) -> BoxStream<'static, Bytes> {
        match self.body {
            ResponseBody::Buffered(b) => Box::pin(futures::stream::once(async move { Ok(b) })),
            ResponseBody::Streaming(stream) => stream,
        }
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.into_bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Read the body to the end and turn the response into a structured error.
    pub async fn into_error(self) -> Error {
        let status = self.status;
        let request_id = self
            .header_str("apim-request-id")
            .or_else(|| self.header_str("x-request-id"))
            .map(str::to_string);
        // A body that fails mid-read still yields the status-carrying error.
        let body = match self.into_bytes().await {
            Ok(b) => String::from_utf8_lossy(&b).into_owned(),
            Err(_) => String::new(),
        };
        Error::Response(crate::error::ResponseError::from_body(status, request_id, body))
    }
}
