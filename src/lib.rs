//! authgate backend library
//!
//! Stateless bearer-token authentication: token issuance at login, token
//! validation, and the per-request auth gate. Exposed for the server binary
//! and integration tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod middleware;

pub use app::build_router;
pub use config::Config;
