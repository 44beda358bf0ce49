//! Gemini provider against a local fake of the Generative Language API.

mod common;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::{test_config, TestApp, TEST_MODEL};
use report_service::config::ProviderKind;
use report_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use report_service::services::providers::{ProviderError, TextProvider};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const API_KEY: &str = "fake-key";

#[derive(Clone, Copy)]
enum Behavior {
    Reply,
    RateLimited,
    ServerError,
    Slow,
}

#[derive(Default)]
struct Seen {
    api_key: Option<String>,
    path: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct FakeState {
    behavior: Behavior,
    seen: Arc<Mutex<Seen>>,
}

struct FakeGemini {
    base_url: String,
    seen: Arc<Mutex<Seen>>,
}

async fn generate_content(
    State(state): State<FakeState>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    {
        let mut seen = state.seen.lock().unwrap();
        seen.api_key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.path = Some(target);
        seen.body = Some(body);
    }

    match state.behavior {
        Behavior::Reply => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "Here you go:\n{\"issues\":[\"typo on page 2\"]," },
                            { "text": "\"recommendation\":\"Fix citations.\",\"guidance\":[]}" }
                        ]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 30 }
            })),
        ),
        Behavior::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "code": 429, "message": "Resource exhausted" } })),
        ),
        Behavior::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "code": 500, "message": "Internal error" } })),
        ),
        Behavior::Slow => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, Json(json!({})))
        }
    }
}

async fn list_models(headers: HeaderMap) -> StatusCode {
    match headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => StatusCode::OK,
        _ => StatusCode::FORBIDDEN,
    }
}

impl FakeGemini {
    async fn spawn(behavior: Behavior) -> Self {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let state = FakeState {
            behavior,
            seen: seen.clone(),
        };

        let router = Router::new()
            .route("/v1beta/models", get(list_models))
            .route("/v1beta/models/:target", post(generate_content))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        FakeGemini {
            base_url: format!("http://127.0.0.1:{}/v1beta", port),
            seen,
        }
    }

    fn provider(&self, api_key: &str, timeout: Duration) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: Secret::new(api_key.to_string()),
            base_url: self.base_url.clone(),
            timeout,
        })
        .expect("Failed to build provider")
    }
}

#[tokio::test]
async fn generate_sends_key_header_and_prompt() {
    let fake = FakeGemini::spawn(Behavior::Reply).await;
    let provider = fake.provider(API_KEY, Duration::from_secs(5));

    let response = provider
        .generate("Review this report", TEST_MODEL)
        .await
        .unwrap();

    assert!(response.text.starts_with("Here you go:"));
    assert!(response.text.ends_with("\"guidance\":[]}"));
    assert_eq!(response.input_tokens, 120);
    assert_eq!(response.output_tokens, 30);

    let seen = fake.seen.lock().unwrap();
    assert_eq!(seen.api_key.as_deref(), Some(API_KEY));
    assert_eq!(
        seen.path.as_deref(),
        Some("gemini-2.0-flash:generateContent")
    );
    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Review this report");
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let fake = FakeGemini::spawn(Behavior::RateLimited).await;
    let provider = fake.provider(API_KEY, Duration::from_secs(5));

    let err = provider.generate("p", TEST_MODEL).await.unwrap_err();
    assert_eq!(err, ProviderError::RateLimited);
}

#[tokio::test]
async fn server_error_keeps_status_and_body_snippet() {
    let fake = FakeGemini::spawn(Behavior::ServerError).await;
    let provider = fake.provider(API_KEY, Duration::from_secs(5));

    match provider.generate("p", TEST_MODEL).await.unwrap_err() {
        ProviderError::ApiError { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal error"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let fake = FakeGemini::spawn(Behavior::Slow).await;
    let provider = fake.provider(API_KEY, Duration::from_millis(200));

    let err = provider.generate("p", TEST_MODEL).await.unwrap_err();
    assert_eq!(err, ProviderError::Timeout);
}

#[tokio::test]
async fn health_check_lists_models_with_the_key() {
    let fake = FakeGemini::spawn(Behavior::Reply).await;

    assert!(fake
        .provider(API_KEY, Duration::from_secs(5))
        .health_check()
        .await
        .is_ok());

    let err = fake
        .provider("wrong-key", Duration::from_secs(5))
        .health_check()
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ApiError { status: 403, .. }));

    let err = fake
        .provider("  ", Duration::from_secs(5))
        .health_check()
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotConfigured(_)));
}

#[tokio::test]
async fn full_request_through_the_service() {
    let fake = FakeGemini::spawn(Behavior::Reply).await;
    let mut config = test_config();
    config.models.provider = ProviderKind::Gemini;
    config.google.api_key = Secret::new(API_KEY.to_string());
    config.google.api_base = fake.base_url.clone();
    let app = TestApp::spawn_from_config(config).await;

    let response = app.post_analyze(json!({"text": "Sample report body."})).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "issues": ["typo on page 2"],
            "recommendation": "Fix citations.",
            "guidance": []
        })
    );

    let ready = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), 200);

    let seen = fake.seen.lock().unwrap();
    let prompt = seen.body.as_ref().unwrap()["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("Sample report body."));
}

#[tokio::test]
async fn upstream_failure_through_the_service_is_generic() {
    let fake = FakeGemini::spawn(Behavior::ServerError).await;
    let mut config = test_config();
    config.models.provider = ProviderKind::Gemini;
    config.google.api_base = fake.base_url.clone();
    let app = TestApp::spawn_from_config(config).await;

    let response = app.post_analyze(json!({"text": "Sample report body."})).await;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "AI analysis failed"}));
}
