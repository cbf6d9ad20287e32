//! Authentication Middleware
//! Mission: Attach a request-scoped identity to every request carrying a valid bearer token

use crate::auth::{
    error::ValidationError,
    jwt::peek_subject,
    models::AuthContext,
    validator::TokenValidator,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Path prefixes that bypass authentication entirely
#[derive(Debug, Clone, Default)]
pub struct ExemptPaths {
    prefixes: Vec<String>,
}

impl ExemptPaths {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Terminal state of the gate for one request
#[derive(Debug)]
pub enum GateOutcome {
    Exempt,
    NoToken,
    AlreadyAuthenticated,
    Authenticated(AuthContext),
    Rejected(ValidationError),
}

impl GateOutcome {
    fn label(&self) -> &'static str {
        match self {
            GateOutcome::Exempt => "exempt",
            GateOutcome::NoToken => "no_token",
            GateOutcome::AlreadyAuthenticated => "already_authenticated",
            GateOutcome::Authenticated(_) => "authenticated",
            GateOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Per-request authentication gate
pub struct AuthGate {
    validator: TokenValidator,
    exempt: ExemptPaths,
}

impl AuthGate {
    pub fn new(validator: TokenValidator, exempt: ExemptPaths) -> Self {
        Self { validator, exempt }
    }

    /// Decide what happens to a request without touching it
    pub async fn evaluate(
        &self,
        path: &str,
        headers: &HeaderMap,
        already_authenticated: bool,
    ) -> GateOutcome {
        if self.exempt.is_exempt(path) {
            return GateOutcome::Exempt;
        }
        if already_authenticated {
            return GateOutcome::AlreadyAuthenticated;
        }

        let Some(token) = bearer_token(headers) else {
            return GateOutcome::NoToken;
        };

        let subject = match peek_subject(token) {
            Ok(subject) => subject,
            Err(e) => return GateOutcome::Rejected(e),
        };

        match self.validator.validate(token, &subject).await {
            Ok(authorities) => GateOutcome::Authenticated(AuthContext::new(subject, authorities)),
            Err(e) => GateOutcome::Rejected(e),
        }
    }
}

/// Extract the token from an exact `Bearer <token>` authorization header.
///
/// Any other shape counts as no token presented.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Auth gate middleware.
///
/// Never rejects: a missing or invalid token leaves the request
/// unauthenticated and route-level extractors decide.
pub async fn auth_gate(State(gate): State<Arc<AuthGate>>, mut req: Request, next: Next) -> Response {
    let already_authenticated = req.extensions().get::<AuthContext>().is_some();
    let path = req.uri().path().to_string();

    let outcome = gate
        .evaluate(&path, req.headers(), already_authenticated)
        .await;

    match outcome {
        GateOutcome::Authenticated(ctx) => {
            debug!(path = %path, principal = %ctx.principal(), "Request authenticated");
            req.extensions_mut().insert(ctx);
        }
        GateOutcome::Rejected(reason) => {
            debug!(path = %path, reason = reason.kind(), "Token rejected, continuing unauthenticated");
        }
        other => {
            debug!(path = %path, outcome = other.label(), "Auth gate passed");
        }
    }

    next.run(req).await
}

/// Extract the auth context from request (use after the auth gate)
pub fn extract_auth_context(req: &Request) -> Option<&AuthContext> {
    req.extensions().get::<AuthContext>()
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Auth error types
#[derive(Debug)]
pub enum AuthError {
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };

        (status, message).into_response()
    }
}

/// Reject unless the context carries `authority`
pub fn require_authority(ctx: &AuthContext, authority: &str) -> Result<(), AuthError> {
    if ctx.has_authority(authority) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
