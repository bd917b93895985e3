use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quizdesk_backend::build_router;
use quizdesk_backend::state::{AppState, Storage};
use quizdesk_job_queue::{
    async_trait, ExplanationGenerator, ExplanationInput, JobQueueError, QueueSettings,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Answers with the correct option, optionally failing the first few calls.
struct StubGenerator {
    calls: AtomicUsize,
    failures: usize,
}

#[async_trait]
impl ExplanationGenerator for StubGenerator {
    async fn generate_explanation(
        &self,
        input: &ExplanationInput,
    ) -> Result<String, JobQueueError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(JobQueueError::generation("upstream unavailable"));
        }
        Ok(format!("{} is supported by the passage.", input.correct_answer))
    }
}

fn app_with(failures: usize) -> (axum::Router, Arc<AppState>) {
    let generator = Arc::new(StubGenerator {
        calls: AtomicUsize::new(0),
        failures,
    });
    let settings = QueueSettings::default().with_retry_delay_base(Duration::from_millis(10));
    let state = Arc::new(AppState::new(Storage::in_memory(), generator, settings));
    (build_router(state.clone()), state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, value)
}

async fn create_passage(app: &axum::Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/passages",
        Some(json!({
            "title": "The Water Cycle",
            "content": "Water evaporates, condenses into clouds, and falls as rain.",
            "comment": "Focus on condensation"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().expect("passage id").to_string()
}

fn question_body() -> Value {
    json!({
        "questionText": "What forms clouds?",
        "options": ["Condensation", "Erosion", "Photosynthesis"],
        "correctAnswer": "Condensation"
    })
}

/// Poll the status endpoint until the question reaches `expected`.
async fn wait_for_status(app: &axum::Router, question_id: &str, expected: &str) -> Value {
    let uri = format!("/api/questions/{question_id}/explanation/status");
    for _ in 0..200 {
        let (status, body) = send(app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        if body["status"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("question {question_id} never reached {expected}");
}

#[tokio::test]
async fn health_and_ready() {
    let (app, _state) = app_with(0);

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));

    let (status, body) = send(&app, "GET", "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn question_without_explanation_is_generated() {
    let (app, _state) = app_with(0);
    let passage_id = create_passage(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/passages/{passage_id}/questions"),
        Some(question_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["jobId"].is_string());
    assert_eq!(body["question"]["explanationStatus"], "pending");
    let question_id = body["question"]["id"].as_str().unwrap().to_string();

    let state = wait_for_status(&app, &question_id, "completed").await;
    assert!(state["generatedAt"].is_string());
    assert!(state["error"].is_null());

    let (status, question) = send(&app, "GET", &format!("/api/questions/{question_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        question["explanation"],
        "Condensation is supported by the passage."
    );

    let (status, passage) = send(&app, "GET", &format!("/api/passages/{passage_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(passage["title"], "The Water Cycle");
    assert_eq!(passage["questions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn handwritten_explanation_is_not_queued() {
    let (app, state) = app_with(0);
    let passage_id = create_passage(&app).await;

    let mut body = question_body();
    body["explanation"] = json!("Clouds are condensed water vapour.");
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/passages/{passage_id}/questions"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["jobId"].is_null());
    assert!(body["question"]["explanationStatus"].is_null());

    let queue = state.explanations.queue_status().await;
    assert_eq!(queue.queue_size, 0);
    assert!(!queue.is_processing);
}

#[tokio::test]
async fn regenerate_recovers_after_retries() {
    // Fails twice, then succeeds on the second retry.
    let (app, _state) = app_with(2);
    let passage_id = create_passage(&app).await;

    let mut body = question_body();
    body["explanation"] = json!("Old explanation.");
    let (_, created) = send(
        &app,
        "POST",
        &format!("/api/passages/{passage_id}/questions"),
        Some(body),
    )
    .await;
    let question_id = created["question"]["id"].as_str().unwrap().to_string();

    let (status, accepted) = send(
        &app,
        "POST",
        &format!("/api/questions/{question_id}/explanation"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{accepted}");
    assert_eq!(accepted["questionId"], question_id.as_str());
    assert_eq!(accepted["status"], "pending");
    assert!(accepted["jobId"].is_string());

    wait_for_status(&app, &question_id, "completed").await;
    let (_, question) = send(&app, "GET", &format!("/api/questions/{question_id}"), None).await;
    assert_eq!(
        question["explanation"],
        "Condensation is supported by the passage."
    );
}

#[tokio::test]
async fn exhausted_retries_leave_question_failed() {
    let (app, state) = app_with(usize::MAX);
    let passage_id = create_passage(&app).await;

    let (_, created) = send(
        &app,
        "POST",
        &format!("/api/passages/{passage_id}/questions"),
        Some(question_body()),
    )
    .await;
    let question_id = created["question"]["id"].as_str().unwrap().to_string();

    let failed = wait_for_status(&app, &question_id, "failed").await;
    assert_eq!(failed["error"], "upstream unavailable");

    // Nothing is left to retry.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.explanations.queue_status().await.queue_size, 0);
}

#[tokio::test]
async fn invalid_question_reports_each_field() {
    let (app, _state) = app_with(0);
    let passage_id = create_passage(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/passages/{passage_id}/questions"),
        Some(json!({
            "questionText": "  ",
            "options": ["Only one"],
            "correctAnswer": "Missing"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validation"]["questionText"]["code"], "empty");
    assert_eq!(body["validation"]["options"]["code"], "count");
    assert_eq!(body["validation"]["correctAnswer"]["code"], "not_an_option");
}

#[tokio::test]
async fn missing_body_and_bad_ids_are_rejected() {
    let (app, _state) = app_with(0);

    let (status, body) = send(&app, "POST", "/api/passages", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing request body"));

    let (status, body) = send(&app, "GET", "/api/questions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid question id"));

    let (status, _) = send(
        &app,
        "GET",
        "/api/passages/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (app, _state) = app_with(0);
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/passages/{missing}/questions"),
        Some(question_body()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/questions/{missing}/explanation"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/questions/{missing}/explanation/status"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queue_endpoints_report_and_clear() {
    let (app, _state) = app_with(0);

    let (status, body) = send(&app, "GET", "/api/explanations/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "queueSize": 0, "isProcessing": false, "oldestJob": null })
    );

    let (status, body) = send(&app, "DELETE", "/api/explanations/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "cleared": true, "removed": 0 }));
}
