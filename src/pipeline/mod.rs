//! 请求流水线：按次尝试执行策略并发送请求。
//!
//! # Request Pipeline
//!
//! Every attempt clones the prepared request, runs the installed [`PolicyChain`] on the
//! clone and hands it to the [`Transport`]. Failed attempts are retried according to
//! [`RetryOptions`]; policy failures are never retried.
//!
//! ```text
//! PipelineRequest ──clone──▶ policies (auth, api-version) ──▶ Transport ──▶ HttpResponse
//!        ▲                                                         │
//!        └──────────────── retryable status / transport error ─────┘
//! ```

pub mod retry;

pub use retry::RetryOptions;

use crate::policy::PolicyChain;
use crate::transport::{HttpResponse, PipelineRequest, Transport};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpPipeline {
    transport: Arc<dyn Transport>,
    per_retry: PolicyChain,
    retry: RetryOptions,
}

impl HttpPipeline {
    pub fn new(transport: Arc<dyn Transport>, per_retry: PolicyChain, retry: RetryOptions) -> Self {
        Self {
            transport,
            per_retry,
            retry,
        }
    }

    pub fn policies(&self) -> &PolicyChain {
        &self.per_retry
    }

    /// Send `request`, retrying transient failures.
    ///
    /// Any status is returned as a response once retries are exhausted; classifying it is
    /// the caller's job.
    pub async fn send(&self, request: &PipelineRequest) -> Result<HttpResponse> {
        let mut attempt: u32 = 0;
        loop {
            let mut req = request.clone();
            self.per_retry.apply(&mut req).await?;

            debug!(
                attempt,
                method = %req.method,
                path = req.url.path(),
                "dispatching request"
            );

            match self.transport.send(req).await {
                Ok(resp) => match self.retry.retry_after_response(&resp, attempt) {
                    Some(delay) => {
                        warn!(
                            http_status = resp.status(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after failed status"
                        );
                        drop(resp);
                        tokio::time::sleep(delay).await;
                    }
                    None => return Ok(resp),
                },
                Err(err) => match self.retry.retry_after_error(&err, attempt) {
                    Some(delay) => {
                        warn!(
                            error = %err,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying after transport error"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
            }
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for HttpPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPipeline")
            .field("per_retry", &self.per_retry)
            .field("retry", &self.retry)
            .finish()
    }
}
