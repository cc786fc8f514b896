use crate::config::SigningSecret;
use crate::error::{AppError, TokenRejection};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

/// Represents the claims encoded within a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The user's identifier.
    pub sub: Uuid,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch. Absent when expiry is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Signing and verification keys derived once from the signing secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl TokenKeys {
    pub fn new(secret: &SigningSecret, ttl: Option<Duration>) -> Self {
        // `exp` is optional and checked in `verify_at` against the caller's instant.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Mints a signed token for `user_id`, issued now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mints a signed token for `user_id` as if issued at `now`.
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp();
        let exp = self
            .ttl
            .map(|ttl| iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)));

        let claims = Claims {
            sub: user_id,
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token's signature and, if it carries one, its expiry
    /// against `now`. A token is valid strictly before its expiry second.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(rejection_for(e.kind())))?;

        match claims.exp {
            Some(exp) if now.timestamp() >= exp => {
                Err(AppError::Unauthorized(TokenRejection::Expired))
            }
            _ => Ok(claims),
        }
    }
}

fn rejection_for(kind: &ErrorKind) -> TokenRejection {
    match kind {
        ErrorKind::InvalidSignature => TokenRejection::BadSignature,
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        _ => TokenRejection::Malformed,
    }
}
