//! Service configuration
//!
//! Every option can be given on the command line or through the environment
//! (a `.env` file is loaded before parsing).

use anyhow::{bail, Context, Result};
use chrono::Duration;
use clap::Parser;
use std::net::SocketAddr;

/// Shortest accepted HMAC secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime (ten years), in seconds
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Parser, Clone)]
#[command(name = "authgate")]
#[command(about = "Stateless bearer-token authentication service")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "AUTHGATE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// SQLite credential database (`:memory:` for an ephemeral store)
    #[arg(long, env = "AUTH_DB_PATH", default_value = "authgate_auth.db")]
    pub db_path: String,

    /// HMAC signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime in seconds
    #[arg(long, env = "JWT_TTL_SECS", default_value_t = 86_400)]
    pub token_ttl_secs: i64,

    /// Path prefixes that skip authentication (comma-separated)
    #[arg(
        long,
        env = "AUTH_EXEMPT_PREFIXES",
        value_delimiter = ',',
        default_value = "/api/auth/login,/api/auth/register"
    )]
    pub exempt_prefixes: Vec<String>,

    /// bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            bail!(
                "JWT_TTL_SECS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS,
                self.token_ttl_secs
            );
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", self.bcrypt_cost);
        }
        if self.db_path.trim().is_empty() {
            bail!("AUTH_DB_PATH must not be empty");
        }
        Ok(())
    }

    pub fn token_lifetime(&self) -> Result<Duration> {
        Duration::try_seconds(self.token_ttl_secs)
            .with_context(|| format!("JWT_TTL_SECS out of range: {}", self.token_ttl_secs))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("exempt_prefixes", &self.exempt_prefixes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["authgate"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--jwt-secret", SECRET]);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.token_lifetime().unwrap(), Duration::hours(24));
        assert_eq!(
            config.exempt_prefixes,
            vec!["/api/auth/login".to_string(), "/api/auth/register".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exempt_prefixes_split_on_comma() {
        let config = parse(&[
            "--jwt-secret",
            SECRET,
            "--exempt-prefixes",
            "/login,/signup,/public",
        ]);
        assert_eq!(config.exempt_prefixes.len(), 3);
        assert_eq!(config.exempt_prefixes[2], "/public");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(parse(&["--jwt-secret", "short"]).validate().is_err());
        assert!(parse(&["--jwt-secret", SECRET, "--token-ttl-secs", "0"])
            .validate()
            .is_err());
        assert!(parse(&["--jwt-secret", SECRET, "--bcrypt-cost", "3"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_oversized_ttl_is_an_error() {
        let huge = i64::MAX.to_string();
        let config = parse(&["--jwt-secret", SECRET, "--token-ttl-secs", &huge]);
        assert!(config.validate().is_err());
        assert!(config.token_lifetime().is_err());

        let beyond = (MAX_TOKEN_TTL_SECS + 1).to_string();
        assert!(parse(&["--jwt-secret", SECRET, "--token-ttl-secs", &beyond])
            .validate()
            .is_err());

        let longest = MAX_TOKEN_TTL_SECS.to_string();
        let config = parse(&["--jwt-secret", SECRET, "--token-ttl-secs", &longest]);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.token_lifetime().unwrap(),
            Duration::seconds(MAX_TOKEN_TTL_SECS)
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = parse(&["--jwt-secret", SECRET]);
        let debug = format!("{:?}", config);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
