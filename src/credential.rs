//! Credentials the client can attach to requests.
//!
//! Acquiring and refreshing tokens is the credential's job; the client only asks for a
//! token on every attempt and puts it on the wire.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;

/// Audience requested from token credentials for the managed-cloud backend.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// A bearer token and, if known, when it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<SystemTime>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens. Shared by every in-flight request, so it must be safe
/// for concurrent use and should cache tokens itself.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scopes: &[&str]) -> crate::Result<AccessToken>;
}

/// A static API key that can be rotated while the client is in use.
#[derive(Clone)]
pub struct KeyCredential {
    key: Arc<ArcSwap<String>>,
}

impl KeyCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Arc::new(ArcSwap::from_pointee(key.into())),
        }
    }

    /// Replace the key; requests prepared afterwards use the new value.
    pub fn update(&self, key: impl Into<String>) {
        self.key.store(Arc::new(key.into()));
    }

    pub fn key(&self) -> Arc<String> {
        self.key.load_full()
    }
}

impl std::fmt::Debug for KeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyCredential(<redacted>)")
    }
}

/// The credential a client was built with.
#[derive(Clone)]
pub enum Credential {
    Token(Arc<dyn TokenCredential>),
    Key(KeyCredential),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Credential::Token"),
            Credential::Key(k) => write!(f, "Credential::Key({:?})", k),
        }
    }
}
