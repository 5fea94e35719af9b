use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    app_state::AppState,
    critique::{
        dtos::{CritiqueRequestBody, CritiqueResponse, ErrorResponse},
        errors::CritiqueError,
    },
};

#[utoipa::path(
    post,
    path = "/api/critique",
    tag = "critique",
    request_body = CritiqueRequestBody,
    responses(
        (status = 200, description = "Critique generated", body = CritiqueResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Nothing could be extracted from the page", body = ErrorResponse),
        (status = 500, description = "Configuration, fetch or completion failure", body = ErrorResponse)
    )
)]
pub async fn create_critique(
    State(state): State<AppState>,
    payload: Result<Json<CritiqueRequestBody>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return CritiqueError::InvalidRequest(format!(
                "invalid request body: {}",
                rejection.body_text()
            ))
            .into_response();
        }
    };

    let request = match payload.validate() {
        Ok(request) => request,
        Err(error) => return CritiqueError::InvalidRequest(error).into_response(),
    };

    match state.pipeline.run(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(error = %err, "critique failed");
            } else {
                warn!(error = %err, "critique rejected");
            }
            err.into_response()
        }
    }
}

/// CORS pre-flight; the headers themselves come from the CORS layer.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("method not allowed")),
    )
        .into_response()
}
