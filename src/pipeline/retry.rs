//! Retry decisions for the request pipeline.
//!
//! Retries wrap dispatch only. Once a response body is being streamed to the caller it
//! is never replayed.

use crate::transport::HttpResponse;
use crate::Error;
use std::env;
use std::time::Duration;

/// Statuses worth another attempt.
pub const RETRY_ON_STATUS: &[u16] = &[408, 429, 500, 502, 503, 504];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(800),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryOptions {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Defaults, with `max_retries` overridden by `AOAI_MAX_RETRIES` when set.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(n) = env::var("AOAI_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            opts.max_retries = n;
        }
        opts
    }

    /// Exponential backoff: `min_delay * 2^attempt`, capped at `max_delay`.
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.min_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = base.saturating_mul(factor).min(self.max_delay.as_millis() as u64);
        Duration::from_millis(delay)
    }

    /// Delay before retrying after a failed status, or `None` to give up.
    ///
    /// `attempt` is 0-based (first failure => attempt=0).
    pub(crate) fn retry_after_response(&self, resp: &HttpResponse, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries || !RETRY_ON_STATUS.contains(&resp.status()) {
            return None;
        }
        let hinted = retry_after(resp).map(|d| d.min(self.max_delay));
        Some(hinted.unwrap_or_else(|| self.backoff_delay(attempt)))
    }

    /// Delay before retrying after an error, or `None` to give up.
    pub(crate) fn retry_after_error(&self, err: &Error, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        match err {
            Error::Transport(_) => Some(self.backoff_delay(attempt)),
            _ => None,
        }
    }
}

/// Parse `retry-after-ms` or the `Retry-After: <seconds>` form.
fn retry_after(resp: &HttpResponse) -> Option<Duration> {
    if let Some(ms) = resp
        .header_str("retry-after-ms")
        .and_then(|s| s.parse::<u64>().ok())
    {
        return Some(Duration::from_millis(ms));
    }
    resp.header_str("retry-after")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
