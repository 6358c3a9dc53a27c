use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use revlens_analysis::{KeywordsAndDescriptions, Pipeline, Report, SessionContext};
use revlens_docs::ScratchDir;
use revlens_llm::ClientOptions;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const REVIEWS_CSV: &str = "rating,body\n5,Quiet and powerful\n2,Lid cracked after a month\n";

struct Harness {
    app: Router,
    session: Arc<Mutex<SessionContext>>,
    llm: MockServer,
    _scratch: TempDir,
}

async fn harness() -> Harness {
    let llm = MockServer::start().await;
    let scratch = tempfile::tempdir().expect("scratch dir");
    let options = ClientOptions {
        base_url: llm.uri(),
        model: "gpt-4o".to_owned(),
        timeout_secs: 5,
        max_retries: 0,
        backoff_base_ms: 0,
    };
    let state = AppState::new(
        Pipeline::default(),
        options,
        ScratchDir::new(scratch.path()),
    );
    Harness {
        session: Arc::clone(&state.session),
        app: build_app(state),
        llm,
        _scratch: scratch,
    }
}

fn completion_body(content: &str) -> Value {
    json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

async fn mount_completions(server: &MockServer, content: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header_matcher("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn send(app: &Router, method: &str, uri: &str, body: Body) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("response")
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let response = send(app, method, uri, body).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

async fn post(app: &Router, uri: &str) -> (StatusCode, Value) {
    send_json(app, "POST", uri, Body::empty()).await
}

/// Save a credential and open the main screen.
async fn unlock(app: &Router) {
    let (status, _) = send_json(
        app,
        "POST",
        "/api/v1/credential",
        Body::from(json!({ "api_key": "sk-test" }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(app, "/api/v1/screen/main").await;
    assert_eq!(status, StatusCode::OK);
}

async fn upload(app: &Router, profile: &str) -> (StatusCode, Value) {
    send_json(
        app,
        "POST",
        &format!("/api/v1/products/{profile}/reviews"),
        Body::from(REVIEWS_CSV),
    )
    .await
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("unauthorized", StatusCode::UNAUTHORIZED),
        ("forbidden", StatusCode::FORBIDDEN),
        ("conflict", StatusCode::CONFLICT),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[tokio::test]
async fn health_returns_envelope_with_request_id() {
    let h = harness().await;
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-health");
}

#[tokio::test]
async fn new_session_starts_on_home() {
    let h = harness().await;
    let (status, json) = send_json(&h.app, "GET", "/api/v1/session", Body::empty()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["screen"], "home");
    assert_eq!(json["data"]["credential_saved"], false);
    assert_eq!(json["data"]["reports"]["main"], Value::Null);
}

#[tokio::test]
async fn blank_credential_is_a_validation_error() {
    let h = harness().await;
    let (status, json) = send_json(
        &h.app,
        "POST",
        "/api/v1/credential",
        Body::from(json!({ "api_key": "   " }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn main_screen_requires_a_credential() {
    let h = harness().await;
    let (status, json) = post(&h.app, "/api/v1/screen/main").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn main_screen_routes_are_refused_on_home() {
    let h = harness().await;
    send_json(
        &h.app,
        "POST",
        "/api/v1/credential",
        Body::from(json!({ "api_key": "sk-test" }).to_string()),
    )
    .await;

    let (status, json) = post(&h.app, "/api/v1/products/main/analyze").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "forbidden");

    let (status, _) = post(&h.app, "/api/v1/reset").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_profile_is_rejected() {
    let h = harness().await;
    unlock(&h.app).await;

    let (status, json) = post(&h.app, "/api/v1/products/ours/analyze").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn analyze_without_upload_is_a_conflict() {
    let h = harness().await;
    unlock(&h.app).await;

    let (status, json) = post(&h.app, "/api/v1/products/main/analyze").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");
}

#[tokio::test]
async fn generators_without_report_are_conflicts() {
    let h = harness().await;
    unlock(&h.app).await;

    for route in [
        "/api/v1/generate/keywords",
        "/api/v1/generate/titles",
        "/api/v1/generate/summary",
    ] {
        let (status, json) = post(&h.app, route).await;
        assert_eq!(status, StatusCode::CONFLICT, "route {route}");
        assert_eq!(json["error"]["code"], "conflict");
    }
}

#[tokio::test]
async fn upload_analyze_generate_download_and_reset() {
    let h = harness().await;
    // One chunk + merge, then one summary call.
    mount_completions(&h.llm, "Customers love the quiet motor.", 3).await;
    unlock(&h.app).await;

    let (status, json) = upload(&h.app, "main").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["chars"].as_u64().unwrap() > 0);

    let (status, json) = post(&h.app, "/api/v1/products/main/analyze").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["report"], "Customers love the quiet motor.");
    assert!(json["data"].get("competitive_edge").is_none());

    let (status, json) = post(&h.app, "/api/v1/generate/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["text"], "Customers love the quiet motor.");

    let response = send(&h.app, "GET", "/api/v1/downloads/review-summary", Body::empty()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Review_Summary.docx\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let (status, json) = post(&h.app, "/api/v1/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["screen"], "main");
    assert_eq!(json["data"]["reports"]["main"], Value::Null);
    assert_eq!(json["data"]["artifacts"]["review_summary"], "");
    assert_eq!(json["data"]["reviews_uploaded"]["main"], true);

    let (status, _) = post(&h.app, "/api/v1/generate/summary").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send_json(&h.app, "GET", "/api/v1/downloads/review-summary", Body::empty()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn keywords_then_titles_use_stored_artifacts() {
    let h = harness().await;
    // chunk + merge + keywords + descriptions + titles
    mount_completions(&h.llm, "quiet", 5).await;
    unlock(&h.app).await;
    upload(&h.app, "main").await;
    post(&h.app, "/api/v1/products/main/analyze").await;

    let (status, json) = post(&h.app, "/api/v1/generate/keywords").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["keywords"], "- quiet");
    assert_eq!(
        json["data"]["combined"],
        "Keyword Recommendations:\n\n- quiet\n\nDynamic Descriptions:\n\n- quiet"
    );

    let (status, json) = post(&h.app, "/api/v1/generate/titles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["text"], "quiet");

    let (_, session) = send_json(&h.app, "GET", "/api/v1/session", Body::empty()).await;
    assert_eq!(session["data"]["artifacts"]["optimized_titles"], "quiet");
}

#[tokio::test]
async fn titles_refuse_stale_keywords_once_the_report_is_empty() {
    let h = harness().await;
    mount_completions(&h.llm, "unused", 0).await;
    unlock(&h.app).await;
    {
        let mut session = h.session.lock().await;
        session.set_keywords_and_descriptions(&KeywordsAndDescriptions {
            keywords: "- quiet".to_owned(),
            descriptions: "- powerful".to_owned(),
        });
        session.store_report(ProfileKind::Main, Report::empty());
    }

    let (status, json) = post(&h.app, "/api/v1/generate/titles").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");
}

#[tokio::test]
async fn reset_during_analysis_discards_the_late_report() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late report"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&h.llm)
        .await;
    unlock(&h.app).await;
    upload(&h.app, "main").await;

    let app = h.app.clone();
    let running =
        tokio::spawn(async move { post(&app, "/api/v1/products/main/analyze").await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let (status, _) = post(&h.app, "/api/v1/reset").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = running.await.expect("analyze task");

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");
    let (_, session) = send_json(&h.app, "GET", "/api/v1/session", Body::empty()).await;
    assert_eq!(session["data"]["reports"]["main"], Value::Null);
}

#[tokio::test]
async fn competitor_analysis_also_generates_competitive_edge() {
    let h = harness().await;
    // chunk + merge + competitive edge
    mount_completions(&h.llm, "Their lid leaks.", 3).await;
    unlock(&h.app).await;
    upload(&h.app, "competitor").await;

    let (status, json) = post(&h.app, "/api/v1/products/competitor/analyze").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["profile"], "competitor");
    assert_eq!(json["data"]["competitive_edge"], "Their lid leaks.");

    let (_, session) = send_json(&h.app, "GET", "/api/v1/session", Body::empty()).await;
    assert_eq!(session["data"]["reports"]["competitor"], "Their lid leaks.");
    assert_eq!(session["data"]["artifacts"]["competitive_edge"], "Their lid leaks.");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway_and_stores_nothing() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "message": "Incorrect API key provided" } })),
        )
        .expect(1)
        .mount(&h.llm)
        .await;
    unlock(&h.app).await;
    upload(&h.app, "main").await;

    let (status, json) = post(&h.app, "/api/v1/products/main/analyze").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
    let (_, session) = send_json(&h.app, "GET", "/api/v1/session", Body::empty()).await;
    assert_eq!(session["data"]["reports"]["main"], Value::Null);
}

#[tokio::test]
async fn unknown_download_is_not_found() {
    let h = harness().await;
    unlock(&h.app).await;

    let (status, json) = send_json(&h.app, "GET", "/api/v1/downloads/everything", Body::empty()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn empty_upload_is_a_validation_error() {
    let h = harness().await;
    unlock(&h.app).await;

    let (status, json) = send_json(
        &h.app,
        "POST",
        "/api/v1/products/main/reviews",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}
