//! HTTP assembly: routes, request logging and the auth gate

use crate::{
    auth::{api as auth_api, auth_gate, AuthGate, AuthState},
    middleware::{logging::HEALTH_PATH, request_logging},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the service router.
///
/// The gate wraps every route (exemption is decided by the gate itself) and
/// sits outside request logging so log lines carry the principal.
pub fn build_router(auth_state: AuthState, gate: Arc<AuthGate>) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/profile", get(auth_api::profile))
        .with_state(auth_state);

    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .merge(auth_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn_with_state(gate, auth_gate))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
