//! Drives the client against a local chat-completions stand-in.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use quizdesk_ai::{AiError, OpenAiExplanationClient, OpenAiSettings};
use quizdesk_job_queue::{ExplanationGenerator, ExplanationInput, JobQueueError};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.requests.lock().await.push((auth, body));
    (state.status, Json(state.body.clone()))
}

/// Start a server answering every completion request with `status` and `body`.
async fn mock_server(
    status: StatusCode,
    body: Value,
) -> (String, Arc<Mutex<Vec<(Option<String>, Value)>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/v1"), requests)
}

fn client(base_url: String, api_key: Option<&str>) -> OpenAiExplanationClient {
    OpenAiExplanationClient::new(OpenAiSettings {
        api_key: api_key.map(str::to_owned),
        base_url,
        model: "test-model".into(),
        ..OpenAiSettings::default()
    })
    .expect("client")
}

fn input() -> ExplanationInput {
    ExplanationInput {
        passage_content: "Ice floats because it is less dense than water.".into(),
        passage_comment: None,
        question_text: "Why does ice float?".into(),
        options: vec!["Lower density".into(), "Higher density".into()],
        correct_answer: "Lower density".into(),
        subject: "physics".into(),
        level: "high school".into(),
    }
}

fn completion(content: Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 42, "completion_tokens": 12, "total_tokens": 54}
    })
}

#[tokio::test]
async fn returns_trimmed_completion_and_sends_expected_request() {
    let (url, requests) = mock_server(
        StatusCode::OK,
        completion(json!("\nIce is less dense, so it floats.\n")),
    )
    .await;
    let client = client(url, Some("sk-test"));

    let text = client.explain(&input()).await.expect("explanation");
    assert_eq!(text, "Ice is less dense, so it floats.");

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("physics"));
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("1. Lower density"));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let (url, _requests) = mock_server(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "rate limited"}}),
    )
    .await;
    let client = client(url, Some("sk-test"));

    let err = client.explain(&input()).await.unwrap_err();
    match err {
        AiError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let (url, _requests) = mock_server(StatusCode::OK, completion(Value::Null)).await;
    let client = client(url, Some("sk-test"));

    let err = client.explain(&input()).await.unwrap_err();
    assert!(matches!(err, AiError::EmptyCompletion));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (url, _requests) = mock_server(StatusCode::OK, json!({"unexpected": true})).await;
    let client = client(url, Some("sk-test"));

    let err = client.explain(&input()).await.unwrap_err();
    assert!(matches!(err, AiError::Decode(_)));
}

#[tokio::test]
async fn missing_key_fails_without_calling_the_api() {
    let (url, requests) = mock_server(StatusCode::OK, completion(json!("unused"))).await;
    let client = client(url, None);

    let err = client.generate_explanation(&input()).await.unwrap_err();
    assert!(matches!(err, JobQueueError::Generation(ref msg) if msg.contains("API key")));
    assert!(requests.lock().await.is_empty());
}

#[tokio::test]
async fn generator_errors_carry_the_client_message() {
    let (url, _requests) = mock_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "upstream exploded"}),
    )
    .await;
    let client = client(url, Some("sk-test"));

    let err = client.generate_explanation(&input()).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("upstream exploded"), "{message}");
}
