//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use std::time::Duration;

use medintel_insights::{GeminiClient, InsightError, TextInsightProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 30, base_url)
        .expect("client construction should not fail")
}

fn candidate_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn summarize_returns_parsed_insights() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
            r#"["Twitter drives most engagement", "Facebook trails", "Post more video"]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let insights = client
        .summarize(
            "Platform Engagements",
            r#"Platform engagements: [{"platform":"Twitter","engagements":190}]"#,
        )
        .await
        .expect("should parse insights");

    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0], "Twitter drives most engagement");
}

#[tokio::test]
async fn prompt_contains_title_and_summary() {
    let server = MockServer::start().await;

    let expected_text = "Based on the following data for \"Media Type Mix\", give the top 3 \
                         concise insights. Be specific and actionable:\n\nMedia type mix: []";

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(serde_json::json!({
            "contents": [ { "role": "user", "parts": [ { "text": expected_text } ] } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let insights = client
        .summarize("Media Type Mix", "Media type mix: []")
        .await
        .expect("empty list is a valid answer");
    assert!(insights.is_empty());
}

#[tokio::test]
async fn client_error_status_is_reported_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry(3, 0);
    let err = client.summarize("t", "s").await.unwrap_err();
    match err {
        InsightError::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(r#"["ok"]"#)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry(2, 0);
    let insights = client.summarize("t", "s").await.expect("retry succeeds");
    assert_eq!(insights, vec!["ok"]);
}

#[tokio::test]
async fn missing_candidates_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, InsightError::EmptyResponse));
}

#[tokio::test]
async fn non_array_text_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidate_body("Here are some insights")),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, InsightError::Deserialize { .. }));
}

#[tokio::test]
async fn attempt_timeout_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate_body(r#"["slow"]"#))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(r#"["fast"]"#)))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 1, &server.uri())
        .expect("client construction should not fail")
        .with_retry(1, 0);
    let insights = client
        .summarize("t", "s")
        .await
        .expect("second attempt succeeds");
    assert_eq!(insights, vec!["fast"]);
}
