//! Per-call cancellation and deadline.

use crate::{CancelReason, Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Governs one operation: the initial dispatch and, for streams, every later pull.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fails immediately if already cancelled or past the deadline.
    pub fn check(&self) -> Result<()> {
        if self.cancel.as_ref().map(|t| t.is_cancelled()).unwrap_or(false) {
            return Err(Error::Cancelled(CancelReason::Cancelled));
        }
        if self.deadline.map(|d| Instant::now() >= d).unwrap_or(false) {
            return Err(Error::Cancelled(CancelReason::DeadlineExceeded));
        }
        Ok(())
    }

    /// Resolves when the call is cancelled or the deadline passes; never otherwise.
    pub async fn done(&self) -> CancelReason {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = cancelled => CancelReason::Cancelled,
            _ = expired => CancelReason::DeadlineExceeded,
        }
    }

    /// Run `fut` unless the call is cancelled first; `fut` is dropped on cancellation.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.done() => Err(Error::Cancelled(reason)),
            out = fut => out,
        }
    }
}
