//! Integration tests for streaming responses

use crate::mock_server::MockServerFixture;
use aoai_client::types::{ChatCompletionsOptions, ChatRequestMessage, CompletionsOptions};
use aoai_client::{Error, StreamCallOptions};
use futures::StreamExt;
use mockito::Matcher;
use serde_json::json;

const CHAT_CHUNKS: &[&str] = &[
    r#"{"id":"c1","choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
    r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hello"}}]}"#,
    r#"{"id":"c1","choices":[{"index":0,"delta":{"content":" World"},"finish_reason":"stop"}]}"#,
    "[DONE]",
];

fn chat(deployment: &str) -> ChatCompletionsOptions {
    ChatCompletionsOptions::new(deployment, vec![ChatRequestMessage::user("Hello")])
}

#[tokio::test]
async fn managed_cloud_chat_stream() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/openai/deployments/gpt-4o/chat/completions")
        .match_query(Matcher::UrlEncoded(
            "api-version".into(),
            "2024-10-21".into(),
        ))
        .match_header("api-key", "test-key")
        .match_header("authorization", Matcher::Missing)
        .match_header("x-ms-client-request-id", Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "stream": true,
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(MockServerFixture::sse_body(CHAT_CHUNKS))
        .expect(1)
        .create_async()
        .await;

    let client = fixture
        .managed_cloud("test-key")
        .api_version("2024-10-21")
        .build()
        .unwrap();
    let stream = client
        .get_chat_completions_stream(&chat("gpt-4o"), StreamCallOptions::new())
        .await
        .unwrap();

    let updates: Vec<_> = stream.collect().await;
    assert_eq!(updates.len(), 3);
    let text: String = updates
        .into_iter()
        .filter_map(|u| {
            u.unwrap()
                .choices
                .first()
                .and_then(|c| c.delta.as_ref())
                .and_then(|d| d.content.clone())
        })
        .collect();
    assert_eq!(text, "Hello World");
    mock.assert_async().await;
}

#[tokio::test]
async fn vendor_direct_chat_stream_uses_bearer_and_flat_path() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_header("api-key", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "stream_options": {"include_usage": true}
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(MockServerFixture::sse_body(&[
            r#"{"id":"c","choices":[{"index":0,"delta":{"content":"hi"}}]}"#,
            r#"{"id":"c","choices":[],"usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
            "[DONE]",
        ]))
        .create_async()
        .await;

    let client = fixture.vendor_direct("sk-test").build().unwrap();
    let mut stream = client
        .get_chat_completions_stream(
            &chat("gpt-4o-mini"),
            StreamCallOptions::new().include_usage(true),
        )
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.choices[0].delta.as_ref().unwrap().content.as_deref(), Some("hi"));
    let last = stream.next().await.unwrap().unwrap();
    assert_eq!(last.usage.unwrap().total_tokens, 4);
    assert!(stream.next().await.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn completions_stream_without_sentinel() {
    let mut fixture = MockServerFixture::new().await;
    let body = r#"{"id":"t","choices":[{"text":"one","index":0}]}"#;
    let _lenient = fixture
        .mock_sse_stream("/openai/deployments/instruct/completions", &[body])
        .await;

    let lenient = fixture.client("k");
    let opts = CompletionsOptions::new("instruct", "count");
    let items: Vec<_> = lenient
        .get_completions_stream(&opts, StreamCallOptions::new())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().choices[0].text, "one");

    let strict = fixture.managed_cloud("k").strict_streaming(true).build().unwrap();
    let items: Vec<_> = strict
        .get_completions_stream(&opts, StreamCallOptions::new())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(Error::Decode { .. })));
}

#[tokio::test]
async fn malformed_frame_ends_stream_with_decode_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(
            "/openai/deployments/gpt-4o/chat/completions",
            &[
                r#"{"id":"c","choices":[]}"#,
                "{this is not json",
                r#"{"id":"c","choices":[]}"#,
                "[DONE]",
            ],
        )
        .await;

    let client = fixture.client("k");
    let items: Vec<_> = client
        .get_chat_completions_stream(&chat("gpt-4o"), StreamCallOptions::new())
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(Error::Decode { .. })));
}
