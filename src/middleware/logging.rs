//! Request logging middleware.
//!
//! Logs every HTTP request with method, path, status code, latency and the
//! authenticated principal, if the auth gate attached one.

use crate::auth::middleware::extract_auth_context;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Path excluded from request logs
pub const HEALTH_PATH: &str = "/health";

/// Must run inside the auth gate to see the principal.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if path == HEALTH_PATH {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let principal = extract_auth_context(&request).map(|ctx| ctx.principal().to_string());
    let principal = principal.as_deref().unwrap_or("-");

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if status >= 500 {
        warn!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            principal,
            "Request failed (5xx)"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            principal,
            "Request completed"
        );
    }

    response
}
