use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    critique::{dtos, handlers},
    health,
};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::create_critique, health::health_check),
    components(schemas(
        dtos::CritiqueRequestBody,
        dtos::CritiqueResponse,
        dtos::CritiqueResult,
        dtos::TitleFeedback,
        dtos::FeedbackPoint,
        dtos::SourceMeta,
        dtos::Mode,
        dtos::ErrorResponse,
        health::HealthResponse
    )),
    tags(
        (name = "critique", description = "Article critique"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/critique",
            post(handlers::create_critique)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route("/healthz", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
