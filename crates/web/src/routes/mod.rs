//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /people
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (backend reachable)
//!
//! # Directory (protected)
//! GET  /people                    - User grid
//! GET  /profile/{id}              - One user's profile
//! GET  /profile/{id}/picture      - One user's picture (binary)
//! GET  /my-profile                - Caller's profile
//! GET  /my-profile/picture        - Caller's picture (binary)
//! GET  /edit-profile              - Edit form
//! POST /edit-profile              - Save profile fields
//! POST /edit-profile/picture      - Upload picture (multipart)
//! POST /edit-profile/picture/delete - Remove picture
//!
//! # Gallery (public)
//! GET  /gallery                   - Album grid
//!
//! # Auth
//! GET  /auth/sign-in              - Redirect to the external sign-in page
//! POST /auth/logout               - Backend logout, then home
//!
//! # JSON API
//! GET  /api/auth/status           - Backend auth status
//! GET  /api/auth/me               - Backend view of the caller
//! POST /api/auth/check-email      - Email authorization check
//! ```

pub mod api;
pub mod auth;
pub mod gallery;
pub mod people;
pub mod profile;

use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, Uri},
    middleware,
    response::Redirect,
    routing::{get, post},
};
use roster_core::Identity;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::request_id::http_request_span;
use crate::middleware::{request_id_middleware, route_guard_middleware, security_headers_middleware};
use crate::state::AppState;

/// Largest accepted profile picture upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Bottom navigation state shared by every page.
#[derive(Debug, Clone)]
pub struct Nav {
    /// Which tab is highlighted: `people`, `gallery` or `profile`.
    pub active: &'static str,
    /// Display name of the signed-in caller.
    pub signed_in_as: Option<String>,
}

impl Nav {
    #[must_use]
    pub fn new(active: &'static str, identity: Option<&Identity>) -> Self {
        Self {
            active,
            signed_in_as: identity.map(Identity::display_name),
        }
    }
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(profile::show))
        .route("/{id}/picture", get(profile::picture))
}

/// Create the caller's own profile routes router.
pub fn my_profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::my_profile))
        .route("/picture", get(profile::my_picture))
}

/// Create the edit-profile routes router.
pub fn edit_profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::edit_page).post(profile::update))
        .route(
            "/picture",
            post(profile::upload_picture).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/picture/delete", post(profile::delete_picture))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(auth::sign_in))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/status", get(api::auth_status))
        .route("/auth/me", get(api::current_user))
        .route("/auth/check-email", post(api::check_email))
}

/// Create all page and API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/people") }))
        .route("/people", get(people::index))
        .nest("/profile", profile_routes())
        .nest("/my-profile", my_profile_routes())
        .nest("/edit-profile", edit_profile_routes())
        .route("/gallery", get(gallery::index))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}

/// Build the full application router with middleware.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .fallback(not_found)
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            route_guard_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(http_request_span)
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Fallback for paths no route matches.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend does not answer `GET /`.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().get_server_info().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
