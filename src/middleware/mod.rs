//! Middleware for observability.
//!
//! Authentication itself lives in `auth::middleware`; this module only
//! provides request logging.

pub mod logging;

pub use logging::request_logging;
