use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    completion_configured: bool,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let completion_configured = state.pipeline.is_configured();
    info!(completion_configured, "Health check");
    Json(HealthResponse {
        status: "OK".to_string(),
        completion_configured,
    })
}
