//! Authentication API Endpoints
//! Mission: Provide registration, login and profile endpoints

use crate::auth::{
    error::StoreError,
    jwt::JwtHandler,
    models::{AuthContext, LoginRequest, RegisterRequest, DEFAULT_AUTHORITY},
    password::{hash_password, verify_password},
    user_store::CredentialStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<dyn CredentialStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub bcrypt_cost: u32,
}

impl AuthState {
    pub fn new(store: Arc<dyn CredentialStore>, jwt_handler: Arc<JwtHandler>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            jwt_handler,
            bcrypt_cost,
        }
    }
}

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<&'static str, AuthApiError> {
    info!("Register request: {}", payload.username);

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingFields);
    }

    let password_hash = hash_password(payload.password, state.bcrypt_cost)
        .await
        .map_err(|e| {
            error!("Password hashing failed: {:#}", e);
            AuthApiError::InternalError
        })?;

    let credential = state
        .store
        .insert(
            &payload.username,
            &password_hash,
            [DEFAULT_AUTHORITY.to_string()].into_iter().collect(),
        )
        .await
        .map_err(|e| match e {
            StoreError::UsernameTaken(_) => AuthApiError::UserAlreadyExists,
            other => {
                error!("Failed to store credential: {}", other);
                AuthApiError::InternalError
            }
        })?;

    info!("User registered: {}", credential.username);

    Ok("User registered successfully")
}

/// Login endpoint - POST /api/auth/login
///
/// Responds with the raw token as the body.
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<String, AuthApiError> {
    info!("Login attempt: {}", payload.username);

    let credential = state
        .store
        .find_by_username(&payload.username)
        .await
        .map_err(|e| {
            error!("Credential lookup failed: {}", e);
            AuthApiError::InternalError
        })?;

    let Some(credential) = credential else {
        warn!("Failed login attempt (unknown user): {}", payload.username);
        return Err(AuthApiError::InvalidCredentials);
    };

    let valid = verify_password(payload.password, credential.password_hash.clone())
        .await
        .map_err(|e| {
            error!("Password verification failed: {:#}", e);
            AuthApiError::InternalError
        })?;

    if !valid {
        warn!("Failed login attempt: {}", payload.username);
        return Err(AuthApiError::InvalidCredentials);
    }

    let issued = state
        .jwt_handler
        .issue(&credential.username)
        .map_err(|e| {
            error!("Token issuance failed: {}", e);
            AuthApiError::InternalError
        })?;

    info!("Login successful: {}", credential.username);

    Ok(issued.token)
}

/// Current principal - GET /api/auth/profile
pub async fn profile(ctx: AuthContext) -> String {
    format!("Hello, {}", ctx.principal())
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    MissingFields,
    UserAlreadyExists,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password")
            }
            AuthApiError::MissingFields => {
                (StatusCode::BAD_REQUEST, "Username and password are required")
            }
            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, "Username already exists"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
