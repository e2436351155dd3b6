use super::{HttpResponse, PipelineRequest, ResponseBody, Transport, TransportError};
use crate::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

pub(crate) const USER_AGENT: &str = concat!("aoai-client/", env!("CARGO_PKG_VERSION"));

/// Knobs for the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Bound on connect + response headers. Streamed bodies are not subject to it.
    pub response_timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            proxy_url: None,
        }
    }
}

impl HttpTransportConfig {
    /// Defaults, overridden by `AOAI_HTTP_TIMEOUT_SECS`, `AOAI_CONNECT_TIMEOUT_SECS`
    /// and `AOAI_PROXY_URL` when set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(secs) = env_secs("AOAI_HTTP_TIMEOUT_SECS") {
            cfg.response_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("AOAI_CONNECT_TIMEOUT_SECS") {
            cfg.connect_timeout = Duration::from_secs(secs);
        }
        cfg.proxy_url = env::var("AOAI_PROXY_URL").ok().filter(|s| !s.is_empty());
        cfg
    }
}

fn env_secs(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|s| *s > 0)
}

/// [`Transport`] over a pooled `reqwest::Client`.
pub struct HttpTransport {
    client: reqwest::Client,
    response_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(
                env::var("AOAI_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            // Conservative HTTP/2 keepalive defaults for long-lived event streams.
            .http2_adaptive_window(true)
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                crate::Error::configuration_with_context(
                    format!("invalid proxy url: {}", e),
                    crate::ErrorContext::new().with_field_path("AOAI_PROXY_URL"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            response_timeout: config.response_timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PipelineRequest) -> Result<HttpResponse> {
        let skip_body = request.should_skip_body_download();
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = tokio::time::timeout(self.response_timeout, builder.send())
            .await
            .map_err(|_| TransportError::Timeout(self.response_timeout))?
            .map_err(TransportError::Http)?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        debug!(http_status = status, skip_body, "response headers received");

        let body = if skip_body {
            ResponseBody::Streaming(Box::pin(
                resp.bytes_stream()
                    .map_err(|e| crate::Error::Transport(TransportError::Http(e))),
            ))
        } else {
            ResponseBody::Buffered(resp.bytes().await.map_err(TransportError::Http)?)
        };

        Ok(HttpResponse::new(status, headers, body))
    }
}
