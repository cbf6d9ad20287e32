//! Authentication Models
//! Mission: Define credential, claims and request-scoped identity structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Authority granted to every self-registered account
pub const DEFAULT_AUTHORITY: &str = "USER";

/// Authority set attached to a principal
pub type Authorities = BTreeSet<String>;

/// Stored credential record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub authorities: Authorities,
    pub created_at: String,
}

impl Credential {
    /// Encode authorities for the single TEXT column they are stored in
    pub fn authorities_column(&self) -> String {
        self.authorities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn parse_authorities(raw: &str) -> Authorities {
        raw.split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub iat: i64,    // issued at, unix seconds
    pub exp: i64,    // expiration, unix seconds
}

/// Result of a successful issuance
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Login request body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request body
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Identity attached to a single request by the auth gate.
///
/// Only the gate constructs it; handlers get a read-only view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    principal: String,
    authorities: Authorities,
}

impl AuthContext {
    pub(crate) fn new(principal: String, authorities: Authorities) -> Self {
        Self {
            principal,
            authorities,
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn authorities(&self) -> &Authorities {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorities_column_round_trip() {
        let credential = Credential {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            authorities: ["USER", "ADMIN"].iter().map(|a| a.to_string()).collect(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let column = credential.authorities_column();
        assert_eq!(column, "ADMIN,USER");
        assert_eq!(Credential::parse_authorities(&column), credential.authorities);
    }

    #[test]
    fn test_parse_authorities_skips_blanks() {
        let parsed = Credential::parse_authorities(" USER ,, ");
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains("USER"));
        assert!(Credential::parse_authorities("").is_empty());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let credential = Credential {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            authorities: Authorities::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&credential).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_issued_token_debug_redacts_token() {
        let issued = IssuedToken {
            token: "aaa.bbb.ccc".to_string(),
            claims: Claims {
                sub: "alice".to_string(),
                iat: 0,
                exp: 3600,
            },
        };
        let debug = format!("{:?}", issued);
        assert!(!debug.contains("aaa.bbb.ccc"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_auth_context_view() {
        let ctx = AuthContext::new(
            "alice".to_string(),
            [DEFAULT_AUTHORITY.to_string()].into_iter().collect(),
        );
        assert_eq!(ctx.principal(), "alice");
        assert!(ctx.has_authority("USER"));
        assert!(!ctx.has_authority("ADMIN"));
    }
}
