//! Demo Host Application
//!
//! Small router served by the binary so the facade has something to
//! observe: a root route, a templated user route, a failing route
//! and a 404 fallback for everything else.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Users known to the demo `/users/:id` route.
const KNOWN_USERS: &[&str] = &["1", "2", "3"];

/// Build the demo routes.
pub fn demo_routes() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/users/:id", get(user))
        .route("/fail", get(fail))
        .fallback(not_found)
}

async fn root() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn user(Path(id): Path<String>) -> impl IntoResponse {
    if KNOWN_USERS.contains(&id.as_str()) {
        (StatusCode::OK, format!("user {id}"))
    } else {
        (StatusCode::NOT_FOUND, format!("user {id} not found"))
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

async fn fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "simulated failure")
}
