//! Token Validator
//! Mission: Turn a presented token into the subject's current authorities

use crate::auth::{
    error::ValidationError, jwt::JwtHandler, models::Authorities, user_store::CredentialStore,
};
use std::sync::Arc;

/// Verifies tokens and resolves authorities from the credential store.
///
/// Authorities are not embedded in tokens, so every successful validation
/// reflects the subject's authorities as currently stored.
#[derive(Clone)]
pub struct TokenValidator {
    jwt: Arc<JwtHandler>,
    store: Arc<dyn CredentialStore>,
}

impl TokenValidator {
    pub fn new(jwt: Arc<JwtHandler>, store: Arc<dyn CredentialStore>) -> Self {
        Self { jwt, store }
    }

    pub async fn validate(
        &self,
        token: &str,
        expected_subject: &str,
    ) -> Result<Authorities, ValidationError> {
        let claims = self.jwt.verify(token, expected_subject)?;

        let credential = self
            .store
            .find_by_username(&claims.sub)
            .await?
            .ok_or(ValidationError::UnknownSubject)?;

        Ok(credential.authorities)
    }
}
