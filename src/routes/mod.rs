//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Content + play sessions
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/questions", get(http::http_get_questions))
        .route("/api/v1/dashboard", get(http::http_get_dashboard))
        .route("/api/v1/password-strength", post(http::http_post_password_strength))
        .route("/api/v1/sessions", post(http::http_post_session))
        .route(
            "/api/v1/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/api/v1/sessions/:id/actions", post(http::http_post_action))
        .route("/api/v1/sessions/:id/submit", post(http::http_post_submit))
        // Accounts
        .route("/api/v1/auth/signup", post(http::http_post_signup))
        .route("/api/v1/auth/signin", post(http::http_post_signin))
        .route("/api/v1/auth/signout", post(http::http_post_signout))
        .route("/api/v1/auth/session", get(http::http_get_auth_session))
        // Backend records
        .route("/api/v1/users/:id", get(http::http_get_user))
        .route("/api/v1/progress/:user_id", get(http::http_get_progress))
        .route("/api/v1/progress/:user_id/:subject", patch(http::http_patch_progress))
        .route("/api/v1/activities", get(http::http_get_activities))
        .route("/api/v1/quiz-results", post(http::http_post_quiz_result))
        .route("/api/v1/achievements/:user_id", get(http::http_get_achievements))
        .route(
            "/api/v1/classes",
            get(http::http_get_classes).post(http::http_post_class),
        )
        .route("/api/v1/classes/:id/students", get(http::http_get_class_students))
        .route("/api/v1/analytics/:teacher_id", get(http::http_get_analytics))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
