//! Backend-aware URL construction.

use crate::{Error, ErrorContext, Result};
use url::Url;

/// Path that is never deployment-scoped, on either backend.
pub const IMAGE_GENERATIONS_SUBMIT: &str = "images/generations:submit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Tenant endpoint, deployment-scoped paths, `api-version` query parameter.
    ManagedCloud,
    /// Flat paths, no `api-version`.
    VendorDirect,
}

/// Where requests go. Fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub endpoint: Url,
    pub kind: BackendKind,
}

impl BackendTarget {
    pub fn new(endpoint: Url, kind: BackendKind) -> Self {
        Self { endpoint, kind }
    }

    pub fn is_managed_cloud(&self) -> bool {
        self.kind == BackendKind::ManagedCloud
    }

    /// Absolute URL for `path` (e.g. `chat/completions`) on this backend.
    ///
    /// The endpoint's own path prefix and query survive. On vendor-direct the deployment
    /// is ignored.
    pub fn format_url(&self, path: &str, deployment: Option<&str>) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let relative = if path == IMAGE_GENERATIONS_SUBMIT {
            path.to_string()
        } else {
            match (self.kind, deployment) {
                (BackendKind::ManagedCloud, Some(deployment)) => format!(
                    "openai/deployments/{}/{}",
                    escape_deployment(deployment)?,
                    path
                ),
                (BackendKind::ManagedCloud, None) => format!("openai/{}", path),
                (BackendKind::VendorDirect, _) => path.to_string(),
            }
        };

        let mut url = self.endpoint.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), relative);
        url.set_path(&joined);
        Ok(url)
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, `/` included.
fn escape_deployment(deployment: &str) -> Result<String> {
    if deployment.is_empty() || deployment == "." || deployment == ".." {
        return Err(Error::validation_with_context(
            format!("invalid deployment name {:?}", deployment),
            ErrorContext::new()
                .with_field_path("request.deployment")
                .with_details("must not be empty, \".\" or \"..\"")
                .with_source("url_router"),
        ));
    }
    Ok(urlencoding::encode(deployment).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managed(endpoint: &str) -> BackendTarget {
        BackendTarget::new(Url::parse(endpoint).unwrap(), BackendKind::ManagedCloud)
    }

    fn vendor(endpoint: &str) -> BackendTarget {
        BackendTarget::new(Url::parse(endpoint).unwrap(), BackendKind::VendorDirect)
    }

    #[test]
    fn managed_cloud_is_deployment_scoped() {
        let url = managed("https://res.openai.azure.com/")
            .format_url("chat/completions", Some("gpt-4o"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions"
        );
    }

    #[test]
    fn managed_cloud_without_deployment() {
        let url = managed("https://res.openai.azure.com")
            .format_url("models", None)
            .unwrap();
        assert_eq!(url.as_str(), "https://res.openai.azure.com/openai/models");
    }

    #[test]
    fn vendor_direct_ignores_deployment_and_keeps_prefix() {
        let url = vendor("https://api.openai.com/v1/")
            .format_url("chat/completions", Some("gpt-4o"))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn image_submit_is_flat_on_both_backends() {
        let m = managed("https://res.openai.azure.com")
            .format_url(IMAGE_GENERATIONS_SUBMIT, Some("dalle"))
            .unwrap();
        assert_eq!(
            m.as_str(),
            "https://res.openai.azure.com/images/generations:submit"
        );
        let v = vendor("https://api.openai.com/v1")
            .format_url(IMAGE_GENERATIONS_SUBMIT, Some("dalle"))
            .unwrap();
        assert_eq!(v.as_str(), "https://api.openai.com/v1/images/generations:submit");
    }

    #[test]
    fn deployment_cannot_escape_its_segment() {
        let url = managed("https://res.openai.azure.com")
            .format_url("embeddings", Some("../admin?x=1#frag"))
            .unwrap();
        assert_eq!(
            url.path(),
            "/openai/deployments/..%2Fadmin%3Fx%3D1%23frag/embeddings"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = managed("https://res.openai.azure.com")
            .format_url("embeddings", Some("my deployment/é"))
            .unwrap();
        assert_eq!(
            url.path(),
            "/openai/deployments/my%20deployment%2F%C3%A9/embeddings"
        );
    }

    #[test]
    fn degenerate_deployments_are_rejected() {
        let target = managed("https://res.openai.azure.com");
        for bad in ["", ".", ".."] {
            let err = target.format_url("completions", Some(bad)).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{bad:?}");
        }
    }

    #[test]
    fn endpoint_query_is_preserved() {
        let url = managed("https://gw.example.com/proxy?tenant=a")
            .format_url("chat/completions", Some("d"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gw.example.com/proxy/openai/deployments/d/chat/completions?tenant=a"
        );
    }
}
