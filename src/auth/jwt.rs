//! JWT Token Handler
//! Mission: Issue and verify HS256 bearer tokens without server-side state

use crate::auth::{
    clock::{Clock, SystemClock},
    error::{IssueError, ValidationError},
    models::{Claims, IssuedToken},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use tracing::debug;

/// The only algorithm this service signs with or accepts
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Handler for token operations.
///
/// Key material is fixed at construction, so a single handler is shared
/// across all request tasks behind an `Arc`.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        // Time checks are done against our own clock with zero leeway.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Issue a token for an already authenticated subject
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, IssueError> {
        if subject.is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let now = self.clock.now();
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + self.lifetime.num_seconds(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)?;

        debug!(
            subject = %claims.sub,
            expires_at = claims.exp,
            "Issued token"
        );

        Ok(IssuedToken { token, claims })
    }

    /// Verify structure, signature, time window and subject, in that order
    pub fn verify(&self, token: &str, expected_subject: &str) -> Result<Claims, ValidationError> {
        let [header, _, _] = split_segments(token)?;
        let declared: AlgorithmOnly = decode_segment(header)?;
        match declared.alg.parse::<Algorithm>() {
            Ok(alg) if alg == SIGNING_ALGORITHM => {}
            _ => return Err(ValidationError::BadSignature),
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            return Err(ValidationError::Expired);
        }
        if now < claims.iat {
            return Err(ValidationError::NotYetValid);
        }
        if claims.sub != expected_subject {
            return Err(ValidationError::SubjectMismatch);
        }

        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> ValidationError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => ValidationError::BadSignature,
        _ => ValidationError::Malformed,
    }
}

#[derive(Deserialize)]
struct AlgorithmOnly {
    alg: String,
}

#[derive(Deserialize)]
struct SubjectOnly {
    sub: String,
}

fn split_segments(token: &str) -> Result<[&str; 3], ValidationError> {
    let mut segments = token.split('.');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(ValidationError::Malformed),
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, ValidationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| ValidationError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| ValidationError::Malformed)
}

/// Read the subject out of a token without checking its signature.
///
/// The result is only ever used as the expected subject for [`JwtHandler::verify`].
pub fn peek_subject(token: &str) -> Result<String, ValidationError> {
    let [_, payload, _] = split_segments(token)?;
    let claims: SubjectOnly = decode_segment(payload)?;

    if claims.sub.is_empty() {
        return Err(ValidationError::Malformed);
    }
    Ok(claims.sub)
}
