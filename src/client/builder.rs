use crate::client::core::{Client, ClientInner, DEFAULT_API_VERSION};
use crate::client::routing::{BackendKind, BackendTarget};
use crate::credential::{Credential, KeyCredential, TokenCredential, COGNITIVE_SERVICES_SCOPE};
use crate::pipeline::{HttpPipeline, RetryOptions};
use crate::policy::{
    ApiVersionPolicy, BearerTokenPolicy, KeyCredentialPolicy, PolicyChain, VendorDirectPolicy,
};
use crate::transport::{HttpTransport, HttpTransportConfig, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Builder for [`Client`].
///
/// Environment overrides are read at [`ClientBuilder::build`]:
/// - `AOAI_HTTP_TIMEOUT_SECS` (default 60; connect + response headers only)
/// - `AOAI_CONNECT_TIMEOUT_SECS` (default 10)
/// - `AOAI_PROXY_URL`
/// - `AOAI_MAX_RETRIES` (default 3)
///
/// Values set on the builder win over the environment.
pub struct ClientBuilder {
    endpoint: String,
    kind: BackendKind,
    credential: Option<Credential>,
    api_version: String,
    allow_insecure_credentials: bool,
    max_retries: Option<u32>,
    retry_delays: Option<(Duration, Duration)>,
    timeout: Option<Duration>,
    strict_streaming: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    fn new(endpoint: impl Into<String>, kind: BackendKind) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind,
            credential: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            allow_insecure_credentials: false,
            max_retries: None,
            retry_delays: None,
            timeout: None,
            strict_streaming: false,
            transport: None,
        }
    }

    /// Managed-cloud tenant endpoint, e.g. `https://<resource>.openai.azure.com`.
    pub fn managed_cloud(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, BackendKind::ManagedCloud)
    }

    /// Vendor-direct endpoint, e.g. `https://api.openai.com/v1`.
    pub fn vendor_direct(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, BackendKind::VendorDirect)
    }

    /// Bearer tokens for the cognitive-services audience. Managed-cloud only.
    pub fn token_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(Credential::Token(credential));
        self
    }

    pub fn key_credential(mut self, key: impl Into<String>) -> Self {
        self.credential = Some(Credential::Key(KeyCredential::new(key)));
        self
    }

    /// Share a rotatable key with the caller; [`KeyCredential::update`] takes effect on
    /// the next attempt.
    pub fn rotating_key_credential(mut self, key: KeyCredential) -> Self {
        self.credential = Some(Credential::Key(key));
        self
    }

    /// Pinned `api-version` for managed-cloud requests.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Permit credentials over plain `http`. Meant for local test servers.
    pub fn allow_insecure_credentials(mut self, allow: bool) -> Self {
        self.allow_insecure_credentials = allow;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Backoff bounds: first retry waits `min`, later ones double up to `max`.
    pub fn retry_delays(mut self, min: Duration, max: Duration) -> Self {
        self.retry_delays = Some((min, max.max(min)));
        self
    }

    /// Bound on connect + response headers. Streamed bodies are not subject to it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Treat an event stream that closes without `[DONE]` as an error.
    pub fn strict_streaming(mut self, enable: bool) -> Self {
        self.strict_streaming = enable;
        self
    }

    /// Replace the reqwest transport, e.g. with a test double.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client> {
        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid endpoint: {}", e),
                ErrorContext::new()
                    .with_field_path("builder.endpoint")
                    .with_details(self.endpoint.clone()),
            )
        })?;
        if endpoint.cannot_be_a_base() || !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "endpoint must be an absolute http(s) URL",
                ErrorContext::new()
                    .with_field_path("builder.endpoint")
                    .with_details(self.endpoint.clone()),
            ));
        }

        let credential = self.credential.ok_or_else(|| {
            Error::configuration_with_context(
                "a credential is required",
                ErrorContext::new().with_field_path("builder.credential"),
            )
        })?;

        let allow_insecure = self.allow_insecure_credentials;
        let policies = match (self.kind, credential) {
            (BackendKind::ManagedCloud, Credential::Token(token)) => PolicyChain::new()
                .with(BearerTokenPolicy::new(
                    token,
                    vec![COGNITIVE_SERVICES_SCOPE.to_string()],
                    allow_insecure,
                ))
                .with(ApiVersionPolicy::new(self.api_version)),
            (BackendKind::ManagedCloud, Credential::Key(key)) => PolicyChain::new()
                .with(KeyCredentialPolicy::new(key, "api-key", allow_insecure))
                .with(ApiVersionPolicy::new(self.api_version)),
            (BackendKind::VendorDirect, Credential::Key(key)) => PolicyChain::new()
                .with(
                    KeyCredentialPolicy::new(key, "authorization", allow_insecure)
                        .with_prefix("Bearer "),
                )
                .with(VendorDirectPolicy),
            (BackendKind::VendorDirect, Credential::Token(_)) => {
                return Err(Error::configuration_with_context(
                    "vendor-direct backend only accepts a key credential",
                    ErrorContext::new().with_field_path("builder.credential"),
                ))
            }
        };

        let mut retry = RetryOptions::from_env();
        if let Some(n) = self.max_retries {
            retry.max_retries = n;
        }
        if let Some((min, max)) = self.retry_delays {
            retry.min_delay = min;
            retry.max_delay = max;
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let mut config = HttpTransportConfig::from_env();
                if let Some(timeout) = self.timeout {
                    config.response_timeout = timeout;
                }
                Arc::new(HttpTransport::new(&config)?)
            }
        };

        debug!(
            endpoint = %endpoint,
            backend = ?self.kind,
            policies = ?policies.names(),
            max_retries = retry.max_retries,
            "aoai client built"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                target: BackendTarget::new(endpoint, self.kind),
                pipeline: HttpPipeline::new(transport, policies, retry),
                strict_streaming: self.strict_streaming,
            }),
        })
    }
}
