//! QuizHub forms server library logic.

pub mod api;
pub mod api_forms;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use quizhub_db::DbPool;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
}

/// Maximum request body size (4 MiB). A form at every validation limit is
/// about 2 MB of JSON when written in ASCII; the rest is headroom for
/// multi-byte text and escapes.
const MAX_REQUEST_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let forms = post(api_forms::create_form_handler).get(api_forms::list_forms_handler);

    Router::new()
        .route("/health", get(health))
        .route("/forms", forms.clone())
        .route("/forms/", forms)
        .route(
            "/forms/{formId}",
            get(api_forms::get_form_handler)
                .put(api_forms::update_form_handler)
                .delete(api_forms::delete_form_handler),
        )
        .route(
            "/forms/{formId}/publish",
            post(api_forms::publish_form_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
