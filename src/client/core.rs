use crate::client::routing::{BackendKind, BackendTarget};
use crate::pipeline::HttpPipeline;
use crate::policy::API_VERSION_PARAM;
use crate::transport::{HttpResponse, PipelineRequest};
use crate::types::{
    ChatCompletions, ChatCompletionsOptions, Completions, CompletionsOptions, DeploymentScoped,
    Embeddings, EmbeddingsOptions, ImageGenerationOptions, ImageGenerations,
};
use crate::Result;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Version request construction stamps on every request before policies run.
pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

pub(crate) const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

pub(crate) struct ClientInner {
    pub(crate) target: BackendTarget,
    pub(crate) pipeline: HttpPipeline,
    pub(crate) strict_streaming: bool,
}

/// Client for the managed-cloud and vendor-direct completion services.
///
/// Cheap to clone; clones share the connection pool and credentials.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("target", &self.inner.target)
            .field("pipeline", &self.inner.pipeline)
            .field("strict_streaming", &self.inner.strict_streaming)
            .finish()
    }
}

impl Client {
    pub fn backend(&self) -> &BackendTarget {
        &self.inner.target
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.inner.target.kind
    }

    /// Names of the per-attempt policies, in execution order.
    pub fn policy_names(&self) -> Vec<&'static str> {
        self.inner.pipeline.policies().names()
    }

    /// Routed request with the default `api-version`, a fresh client request id and the
    /// JSON-serialized `body`. Policies adjust it per attempt.
    pub(crate) fn new_request<B: Serialize + ?Sized>(
        &self,
        path: &str,
        deployment: Option<&str>,
        body: &B,
    ) -> Result<PipelineRequest> {
        let url = self.inner.target.format_url(path, deployment)?;
        let mut request = PipelineRequest::new(Method::POST, url);
        request.set_query_param(API_VERSION_PARAM, DEFAULT_API_VERSION);
        request.set_header(CLIENT_REQUEST_ID_HEADER, &Uuid::new_v4().to_string())?;
        request.set_header("user-agent", crate::transport::http::USER_AGENT)?;
        request.set_header("accept", "application/json")?;
        request.set_json_body(serde_json::to_vec(body)?);
        Ok(request)
    }

    /// Log and convert a non-200 response. The body is read to the end first.
    pub(crate) async fn fail(
        &self,
        resp: HttpResponse,
        request: &PipelineRequest,
        started: Instant,
    ) -> crate::Error {
        let err = resp.into_error().await;
        let client_request_id = request
            .headers
            .get(CLIENT_REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        info!(
            http_status = err.status(),
            path = request.url.path(),
            client_request_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "aoai request failed"
        );
        err
    }

    async fn send_json<B, T>(&self, path: &str, deployment: Option<&str>, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let request = self.new_request(path, deployment, body)?;
        let resp = self.inner.pipeline.send(&request).await?;
        if resp.status() != 200 {
            return Err(self.fail(resp, &request, started).await);
        }
        resp.json().await
    }

    pub async fn get_completions(&self, options: &CompletionsOptions) -> Result<Completions> {
        self.send_json("completions", options.deployment_name(), options)
            .await
    }

    pub async fn get_chat_completions(
        &self,
        options: &ChatCompletionsOptions,
    ) -> Result<ChatCompletions> {
        self.send_json("chat/completions", options.deployment_name(), options)
            .await
    }

    pub async fn get_embeddings(&self, options: &EmbeddingsOptions) -> Result<Embeddings> {
        self.send_json("embeddings", options.deployment_name(), options)
            .await
    }

    pub async fn get_image_generations(
        &self,
        options: &ImageGenerationOptions,
    ) -> Result<ImageGenerations> {
        self.send_json("images/generations", options.deployment_name(), options)
            .await
    }
}
