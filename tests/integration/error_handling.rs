//! Integration tests for error handling, retries and the credential guards

use crate::mock_server::MockServerFixture;
use aoai_client::types::{ChatCompletionsOptions, ChatRequestMessage, EmbeddingsOptions};
use aoai_client::{AccessToken, ClientBuilder, Error, StreamCallOptions, TokenCredential};
use async_trait::async_trait;
use mockito::Matcher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CHAT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

const CHAT_OK: &str = r#"{"id":"c1","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"message":{"role":"assistant","content":"pong"},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1,"total_tokens":2}}"#;

fn chat() -> ChatCompletionsOptions {
    ChatCompletionsOptions::new("gpt-4o", vec![ChatRequestMessage::user("ping")])
}

#[tokio::test]
async fn rate_limited_then_success_is_retried() {
    let mut fixture = MockServerFixture::new().await;
    let limited = fixture
        .server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after-ms", "5")
        .with_body(r#"{"error":{"code":"429","message":"Rate limit reached"}}"#)
        .expect(1)
        .create_async()
        .await;
    let ok = fixture
        .mock_json_response(CHAT_PATH, 200, CHAT_OK)
        .await;

    let resp = fixture.client("k").get_chat_completions(&chat()).await.unwrap();
    assert_eq!(resp.first_content(), Some("pong"));
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn exhausted_retries_surface_status() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error":{"code":"429","message":"Rate limit reached"}}"#)
        .expect(3)
        .create_async()
        .await;

    let client = fixture.managed_cloud("k").max_retries(2).build().unwrap();
    let err = client
        .get_chat_completions_stream(&chat(), StreamCallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
    match err {
        Error::Response(r) => {
            assert_eq!(r.error_code.as_deref(), Some("429"));
            assert_eq!(r.message.as_deref(), Some("Rate limit reached"));
        }
        other => panic!("unexpected {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn content_filter_refusal_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", CHAT_PATH)
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("apim-request-id", "req-123")
        .with_body(
            r#"{"error":{"code":"content_filter","message":"The response was filtered","innererror":{"code":"ResponsibleAIPolicyViolation","content_filter_result":{"violence":{"filtered":true,"severity":"medium"},"hate":{"filtered":false,"severity":"safe"}}}}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let err = fixture.client("k").get_chat_completions(&chat()).await.unwrap_err();
    match err {
        Error::Response(r) => {
            assert_eq!(r.status, 400);
            assert!(r.is_content_filter());
            assert_eq!(r.request_id.as_deref(), Some("req-123"));
            let filter = r.content_filter.expect("filter details");
            assert!(filter.any_filtered());
            assert!(filter.violence.unwrap().filtered);
        }
        other => panic!("unexpected {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn credentials_are_not_sent_over_plain_http() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = ClientBuilder::managed_cloud(&fixture.base_url)
        .key_credential("k")
        .build()
        .unwrap();
    let err = client.get_chat_completions(&chat()).await.unwrap_err();
    assert!(matches!(err, Error::InsecureTransport { .. }));
    mock.assert_async().await;
}

struct CountingToken(AtomicUsize);

#[async_trait]
impl TokenCredential for CountingToken {
    async fn get_token(&self, scopes: &[&str]) -> aoai_client::Result<AccessToken> {
        assert_eq!(scopes, &["https://cognitiveservices.azure.com/.default"][..]);
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new(format!("token-{}", n)))
    }
}

#[tokio::test]
async fn bearer_token_is_fetched_per_attempt() {
    let mut fixture = MockServerFixture::new().await;
    let first = fixture
        .server
        .mock("POST", "/openai/deployments/emb/embeddings")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer token-0")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let second = fixture
        .server
        .mock("POST", "/openai/deployments/emb/embeddings")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer token-1")
        .match_header("api-key", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"data":[{"embedding":[0.1,0.2],"index":0}],"usage":{"prompt_tokens":2,"total_tokens":2}}"#)
        .expect(1)
        .create_async()
        .await;

    let token = Arc::new(CountingToken(AtomicUsize::new(0)));
    let client = ClientBuilder::managed_cloud(&fixture.base_url)
        .token_credential(token.clone())
        .allow_insecure_credentials(true)
        .retry_delays(
            std::time::Duration::from_millis(1),
            std::time::Duration::from_millis(5),
        )
        .build()
        .unwrap();
    let out = client
        .get_embeddings(&EmbeddingsOptions::new("emb", vec!["hello".into()]))
        .await
        .unwrap();
    assert_eq!(out.data[0].embedding.len(), 2);
    assert_eq!(token.0.load(Ordering::SeqCst), 2);
    first.assert_async().await;
    second.assert_async().await;
}
