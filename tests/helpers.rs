use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use critic::{
    app::create_app,
    app_state::AppState,
    config::{CompletionConfig, ModelStrategy},
    critique::CritiquePipeline,
};

pub const API_KEY: &str = "test-key";

/// Completion settings pointing at a mock server.
pub fn completion_config(server: &MockServer, models: &[&str]) -> CompletionConfig {
    CompletionConfig::new(Some(API_KEY.to_string()), format!("{}/v1beta", server.uri()))
        .with_models(models.iter().copied())
        .with_strategy(ModelStrategy::Fallback)
}

pub fn test_app(config: &CompletionConfig) -> Router {
    create_app(AppState::new(CritiquePipeline::from_config(config)))
}

pub async fn post_json(app: Router, body: Value) -> (u16, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/critique")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

pub async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// A Gemini-style envelope wrapping `text` as the first candidate.
pub fn envelope(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

pub const CRITIQUE_JSON: &str = r#"{
  "title_feedback": {"score": 6, "comment": "Specific enough, but lacks a hook."},
  "overall_score": 7,
  "overall_comment": "Well organised; needs first-hand evidence.",
  "feedback_points": [
    {"point": "Title rewrite", "suggestion": "How I cut build times by 60% with caching"},
    {"point": "Experiential specificity", "suggestion": "Show the before/after numbers."},
    {"point": "Originality and primary data", "suggestion": "Publish your benchmark script."},
    {"point": "Structural logic", "suggestion": "Lead with the result."},
    {"point": "Coverage and internal linking", "suggestion": "Link the CI setup article."}
  ]
}"#;
