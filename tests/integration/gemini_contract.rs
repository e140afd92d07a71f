//! Gemini adapter contract tests against a mock HTTP server.

use std::sync::Arc;

use futures_util::StreamExt;
use screenwise::ai::gemini::{GeminiConfig, GeminiTextService};
use screenwise::ai::{AiError, AiTextService};
use screenwise::context::StaticContext;
use screenwise::credentials::StaticSecrets;
use screenwise::host::HostSpeechInput;
use screenwise::overlay::{
    Collaborators, ErrorKind, OverlayStore, ResponseState, StoreOptions, UserIntent,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.0-flash";
const STREAM_PATH: &str = "/v1beta/models/gemini-2.0-flash:streamGenerateContent";

fn sse_chunk(text: &str) -> String {
    let chunk = json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"}
        }]
    });
    format!("data: {chunk}\r\n\r\n")
}

fn sse_body(parts: &[&str]) -> String {
    let mut body: String = parts.iter().map(|p| sse_chunk(p)).collect();
    body.push_str(&format!(
        "data: {}\r\n\r\n",
        json!({"candidates": [{"finishReason": "STOP"}]})
    ));
    body
}

fn service(server: &MockServer, key: Option<&str>) -> GeminiTextService {
    let secrets = match key {
        Some(key) => StaticSecrets::new(key),
        None => StaticSecrets::empty(),
    };
    GeminiTextService::new(
        GeminiConfig::new(MODEL).with_base_url(server.uri()),
        Arc::new(secrets),
    )
}

async fn collect(service: &GeminiTextService) -> Result<Vec<String>, AiError> {
    let mut stream = service.submit("Summarize.", "screen text").await?;
    let mut parts = Vec::new();
    while let Some(part) = stream.next().await {
        parts.push(part?);
    }
    Ok(parts)
}

#[tokio::test]
async fn streams_candidate_text_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {"maxOutputTokens": 1024}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Hel", "lo ", "world"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let parts = collect(&service(&server, Some("test-key"))).await.unwrap();
    assert_eq!(parts, vec!["Hel", "lo ", "world"]);
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = collect(&service(&server, None)).await.unwrap_err();
    assert!(matches!(err, AiError::AuthError(_)));
}

#[tokio::test]
async fn http_statuses_map_to_error_kinds() {
    let cases = [
        (401, ErrorKind::AuthenticationError),
        (403, ErrorKind::AuthenticationError),
        (429, ErrorKind::RateLimitError),
        (503, ErrorKind::NetworkError),
        (404, ErrorKind::UnknownError),
    ];
    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STREAM_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": "nope", "status": "ERR"}
            })))
            .mount(&server)
            .await;

        let err = collect(&service(&server, Some("k"))).await.unwrap_err();
        assert_eq!(err.kind(), expected, "HTTP {status}");
    }
}

#[tokio::test]
async fn invalid_api_key_on_400_is_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = collect(&service(&server, Some("bad"))).await.unwrap_err();
    assert!(matches!(err, AiError::AuthError(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn blocked_prompt_is_invalid_response() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {}\n\n",
        json!({"promptFeedback": {"blockReason": "SAFETY"}})
    );
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let err = collect(&service(&server, Some("k"))).await.unwrap_err();
    assert!(matches!(err, AiError::InvalidResponse(_)));
}

#[tokio::test]
async fn store_streams_a_gemini_response_to_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Short ", "summary."])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (speech, _recognizer) = HostSpeechInput::new();
    let store = OverlayStore::new(
        Collaborators {
            context: Arc::new(StaticContext::new("A long article about Rust.")),
            ai: Arc::new(service(&server, Some("k"))),
            speech: Arc::new(speech),
        },
        StoreOptions::default(),
    )
    .unwrap();

    store.dispatch(UserIntent::SummarizeScreen);
    let state = crate::helpers::wait_for_state(&store, |s| {
        matches!(
            s.response,
            ResponseState::Succeeded { .. } | ResponseState::Failed { .. }
        )
    })
    .await;
    assert_eq!(state.response.visible_text(), Some("Short summary."));
}
