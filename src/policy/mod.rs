//! Request policies: per-attempt hooks that adapt an outgoing request to the target backend.
//!
//! A policy sees the request after it has been cloned for an attempt and before it is
//! handed to the transport. It can rewrite URL, query and headers, or fail the attempt;
//! it never produces a response of its own.

pub mod api_version;
pub mod auth;

pub use api_version::{ApiVersionPolicy, VendorDirectPolicy, API_VERSION_PARAM};
pub use auth::{BearerTokenPolicy, KeyCredentialPolicy};

use crate::transport::PipelineRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Policy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn on_request(&self, request: &mut PipelineRequest) -> Result<()>;
}

/// Policies that run, in order, on every attempt.
#[derive(Clone, Default)]
pub struct PolicyChain {
    pub(crate) policies: Vec<std::sync::Arc<dyn Policy>>,
}

impl PolicyChain {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    pub fn with<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(std::sync::Arc::new(policy));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }

    pub async fn apply(&self, request: &mut PipelineRequest) -> Result<()> {
        for policy in &self.policies {
            policy.on_request(request).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PolicyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
