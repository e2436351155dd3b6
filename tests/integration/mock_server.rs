//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use aoai_client::{Client, ClientBuilder};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

/// Test fixture that owns a mockito server and builds clients pointed at it.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Managed-cloud builder with an `api-key`, fast retries and plain http allowed.
    pub fn managed_cloud(&self, key: &str) -> ClientBuilder {
        ClientBuilder::managed_cloud(&self.base_url)
            .key_credential(key)
            .allow_insecure_credentials(true)
            .retry_delays(Duration::from_millis(1), Duration::from_millis(5))
    }

    /// Vendor-direct builder rooted at `<server>/v1`.
    pub fn vendor_direct(&self, key: &str) -> ClientBuilder {
        ClientBuilder::vendor_direct(format!("{}/v1", self.base_url))
            .key_credential(key)
            .allow_insecure_credentials(true)
            .retry_delays(Duration::from_millis(1), Duration::from_millis(5))
    }

    pub fn client(&self, key: &str) -> Client {
        self.managed_cloud(key).build().expect("build client")
    }

    /// SSE body from `data:` payloads, one event each.
    pub fn sse_body(chunks: &[&str]) -> String {
        chunks
            .iter()
            .map(|chunk| format!("data: {}\n\n", chunk))
            .collect()
    }

    /// Successful event-stream response on `path` (any query).
    pub async fn mock_sse_stream(&mut self, path: &str, chunks: &[&str]) -> Mock {
        self.server
            .mock("POST", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(Self::sse_body(chunks))
            .create_async()
            .await
    }

    /// JSON response with `status` on `path` (any query).
    pub async fn mock_json_response(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
