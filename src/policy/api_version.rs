//! `api-version` query parameter handling for the two backends.

use super::Policy;
use crate::transport::PipelineRequest;
use crate::Result;
use async_trait::async_trait;

pub const API_VERSION_PARAM: &str = "api-version";

/// Force-sets `api-version` to the client's pinned version, overwriting whatever the
/// request builder emitted.
///
/// NOTE: stopgap. Request construction only knows the crate default version; once it
/// emits the configured version this policy can be removed.
#[derive(Debug, Clone)]
pub struct ApiVersionPolicy {
    version: String,
}

impl ApiVersionPolicy {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

#[async_trait]
impl Policy for ApiVersionPolicy {
    fn name(&self) -> &'static str {
        "api_version"
    }

    async fn on_request(&self, request: &mut PipelineRequest) -> Result<()> {
        request.set_query_param(API_VERSION_PARAM, &self.version);
        Ok(())
    }
}

/// Strips `api-version`; the vendor-direct service rejects it.
#[derive(Debug, Clone, Default)]
pub struct VendorDirectPolicy;

#[async_trait]
impl Policy for VendorDirectPolicy {
    fn name(&self) -> &'static str {
        "vendor_direct"
    }

    async fn on_request(&self, request: &mut PipelineRequest) -> Result<()> {
        request.remove_query_param(API_VERSION_PARAM);
        Ok(())
    }
}
