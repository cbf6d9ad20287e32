//! Error taxonomy for token issuance, validation and credential storage

use thiserror::Error;

/// Token issuance failures
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("Subject must not be empty")]
    EmptySubject,
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Reasons a presented token does not authenticate a request
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature does not verify")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token is not valid yet")]
    NotYetValid,
    #[error("Token subject does not match the asserted subject")]
    SubjectMismatch,
    #[error("Token subject has no credential")]
    UnknownSubject,
    #[error("Credential lookup failed: {0}")]
    CredentialLookup(#[from] StoreError),
}

impl ValidationError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Malformed => "malformed",
            ValidationError::BadSignature => "bad_signature",
            ValidationError::Expired => "expired",
            ValidationError::NotYetValid => "not_yet_valid",
            ValidationError::SubjectMismatch => "subject_mismatch",
            ValidationError::UnknownSubject => "unknown_subject",
            ValidationError::CredentialLookup(_) => "credential_lookup",
        }
    }
}

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Corrupt credential row: {0}")]
    Corrupt(String),
}
