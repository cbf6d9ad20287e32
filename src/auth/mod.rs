//! Authentication Module
//! Mission: Stateless bearer-token authentication for every inbound request

pub mod api;
pub mod clock;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;
pub mod validator;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_gate, AuthGate, ExemptPaths};
pub use models::AuthContext;
pub use user_store::{CredentialStore, SqliteUserStore};
pub use validator::TokenValidator;
