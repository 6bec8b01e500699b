//! HTTP API for NovelForge Sentinel.
//!
//! All endpoints live under `/api/v1` and speak JSON. Successful responses
//! are wrapped as `{"data": ...}`, failures as `{"error": {"code", "message"}}`.

mod auth;
mod error;
mod routes;
mod scheduler;
mod state;

use axum::Router;
use axum::routing::{delete, get, patch, post};

pub use auth::{Authenticated, ClientIp, MaybeAuthenticated, client_ip};
pub use error::{ApiError, ApiResult};
pub use scheduler::spawn_scheduled_scan;
pub use state::{AppState, Services};

/// Build the HTTP API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health))
        .route("/api/v1/devices/verify", post(routes::verify_device))
        .route("/api/v1/devices/bind", post(routes::bind_device))
        .route("/api/v1/devices/{id}", delete(routes::unbind_device))
        .route("/api/v1/licenses", post(routes::generate_licenses))
        .route(
            "/api/v1/licenses/{key}",
            get(routes::license_info).patch(routes::update_license),
        )
        .route("/api/v1/security/events", post(routes::report_event))
        .route(
            "/api/v1/security/events/{id}/resolve",
            post(routes::resolve_event),
        )
        .route("/api/v1/security/scan", post(routes::scan_threats))
        .route("/api/v1/admin/bootstrap", post(routes::bootstrap_admin))
        .route("/api/v1/admin/users", post(routes::create_user))
        .route(
            "/api/v1/admin/users/{id}/role",
            patch(routes::update_user_role),
        )
        .route("/api/v1/ai/usage", post(routes::record_ai_usage))
        .with_state(state)
}
