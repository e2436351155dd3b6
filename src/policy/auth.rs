//! Credential attachment.

use super::Policy;
use crate::credential::{KeyCredential, TokenCredential};
use crate::transport::PipelineRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

fn ensure_secure(request: &PipelineRequest, allow_insecure: bool) -> Result<()> {
    let scheme = request.url.scheme();
    if scheme != "https" && !allow_insecure {
        return Err(Error::InsecureTransport {
            scheme: scheme.to_string(),
        });
    }
    Ok(())
}

/// Sets `Authorization: Bearer <token>` with a token fetched for every attempt.
pub struct BearerTokenPolicy {
    credential: Arc<dyn TokenCredential>,
    scopes: Vec<String>,
    allow_insecure: bool,
}

impl BearerTokenPolicy {
    pub fn new(credential: Arc<dyn TokenCredential>, scopes: Vec<String>, allow_insecure: bool) -> Self {
        Self {
            credential,
            scopes,
            allow_insecure,
        }
    }
}

#[async_trait]
impl Policy for BearerTokenPolicy {
    fn name(&self) -> &'static str {
        "bearer_token"
    }

    async fn on_request(&self, request: &mut PipelineRequest) -> Result<()> {
        ensure_secure(request, self.allow_insecure)?;
        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        let token = self.credential.get_token(&scopes).await?;
        request.set_header("authorization", &format!("Bearer {}", token.token))
    }
}

/// Sets a static key header, optionally prefixed (e.g. `Bearer `).
pub struct KeyCredentialPolicy {
    credential: KeyCredential,
    header: String,
    prefix: Option<String>,
    allow_insecure: bool,
}

impl KeyCredentialPolicy {
    pub fn new(credential: KeyCredential, header: impl Into<String>, allow_insecure: bool) -> Self {
        Self {
            credential,
            header: header.into(),
            prefix: None,
            allow_insecure,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

#[async_trait]
impl Policy for KeyCredentialPolicy {
    fn name(&self) -> &'static str {
        "key_credential"
    }

    async fn on_request(&self, request: &mut PipelineRequest) -> Result<()> {
        ensure_secure(request, self.allow_insecure)?;
        let key = self.credential.key();
        let value = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key.to_string(),
        };
        request.set_header(&self.header, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::AccessToken;
    use reqwest::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    struct CountingToken {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenCredential for CountingToken {
        async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken> {
            assert_eq!(scopes, &[crate::credential::COGNITIVE_SERVICES_SCOPE]);
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("tok-{}", n)))
        }
    }

    fn req(url: &str) -> PipelineRequest {
        PipelineRequest::new(Method::POST, Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn bearer_token_is_fetched_per_call() {
        let cred = Arc::new(CountingToken {
            calls: AtomicUsize::new(0),
        });
        let policy = BearerTokenPolicy::new(
            cred.clone(),
            vec![crate::credential::COGNITIVE_SERVICES_SCOPE.to_string()],
            false,
        );
        let mut r = req("https://res.openai.azure.com/openai/x");
        policy.on_request(&mut r).await.unwrap();
        assert_eq!(r.headers["authorization"], "Bearer tok-0");
        policy.on_request(&mut r).await.unwrap();
        assert_eq!(r.headers["authorization"], "Bearer tok-1");
        assert_eq!(cred.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn key_policy_with_and_without_prefix() {
        let key = KeyCredential::new("secret");
        let mut r = req("https://res.openai.azure.com/openai/x");
        KeyCredentialPolicy::new(key.clone(), "api-key", false)
            .on_request(&mut r)
            .await
            .unwrap();
        assert_eq!(r.headers["api-key"], "secret");
        assert!(r.headers["api-key"].is_sensitive());

        let mut r = req("https://api.openai.com/v1/x");
        KeyCredentialPolicy::new(key, "authorization", false)
            .with_prefix("Bearer ")
            .on_request(&mut r)
            .await
            .unwrap();
        assert_eq!(r.headers["authorization"], "Bearer secret");
    }

    #[tokio::test]
    async fn refuses_plain_http_unless_allowed() {
        let key = KeyCredential::new("secret");
        let mut r = req("http://localhost:8080/openai/x");
        let err = KeyCredentialPolicy::new(key.clone(), "api-key", false)
            .on_request(&mut r)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsecureTransport { ref scheme } if scheme == "http"));
        assert!(r.headers.get("api-key").is_none());

        KeyCredentialPolicy::new(key, "api-key", true)
            .on_request(&mut r)
            .await
            .unwrap();
        assert_eq!(r.headers["api-key"], "secret");
    }

    #[tokio::test]
    async fn bearer_refuses_plain_http_before_fetching_token() {
        let cred = Arc::new(CountingToken {
            calls: AtomicUsize::new(0),
        });
        let policy = BearerTokenPolicy::new(
            cred.clone(),
            vec![crate::credential::COGNITIVE_SERVICES_SCOPE.to_string()],
            false,
        );
        let mut r = req("http://res.local/openai/x");
        assert!(policy.on_request(&mut r).await.is_err());
        assert_eq!(cred.calls.load(Ordering::SeqCst), 0);
    }
}
