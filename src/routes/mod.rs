// src/routes/mod.rs

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::IntakeError, AppState};

pub mod assistant;
pub mod complaints;
pub mod escalations;
pub mod field_managers;
pub mod health;
pub mod statistics;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn api_error(e: IntakeError) -> (StatusCode, String) {
    match e {
        IntakeError::Validation(_) | IntakeError::InvalidTransition { .. } => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        IntakeError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        IntakeError::RoutingFailure { .. } => (StatusCode::CONFLICT, e.to_string()),
        IntakeError::Store(_) => internal_error(e),
    }
}

pub type ApiResult<T> = Result<axum::Json<T>, (StatusCode, String)>;

/// Full API router with state and middleware applied.
pub fn router(state: AppState) -> Router {
    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(health::health))
        // complaints
        .route(
            "/api/v1/complaints",
            post(complaints::create_complaint).get(complaints::list_complaints),
        )
        .route("/api/v1/complaints/:id", get(complaints::get_complaint))
        .route("/api/v1/complaints/:id/status", post(complaints::update_status))
        .route("/api/v1/complaints/:id/assign", post(complaints::assign_complaint))
        .route("/api/v1/complaints/:id/escalate", post(complaints::escalate_complaint))
        .route("/api/v1/complaints/:id/notes", post(complaints::add_note))
        .route(
            "/api/v1/complaints/:id/tags",
            post(complaints::add_tag).delete(complaints::remove_tag),
        )
        .route("/api/v1/tags/:tag/complaints", get(complaints::list_by_tag))
        // escalation sweep
        .route("/api/v1/escalations/sweep", post(escalations::sweep))
        // field managers
        .route(
            "/api/v1/field-managers",
            post(field_managers::create_field_manager).get(field_managers::list_field_managers),
        )
        .route(
            "/api/v1/field-managers/:id/release",
            post(field_managers::release_field_manager),
        )
        // reporting
        .route("/api/v1/statistics", get(statistics::get_statistics))
        // chat intake
        .route("/api/v1/assistant/messages", post(assistant::post_message))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
