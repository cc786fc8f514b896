//! The only component that issues or validates tokens.
//!
//! `AuthService` holds the credential store and the token keys. The keys are
//! derived from the signing secret once at construction and never change, so a
//! single service value is shared across all request handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::auth::token::TokenKeys;
use crate::auth::RegisterRequest;
use crate::config::Config;
use crate::error::{AppError, TokenRejection};
use crate::models::UserRecord;
use crate::store::{CredentialStore, UserRepository};

#[derive(Clone)]
pub struct AuthService {
    store: CredentialStore,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(store: CredentialStore, keys: TokenKeys) -> Self {
        Self { store, keys }
    }

    /// Builds the service from startup configuration over the given repository.
    pub async fn from_config(
        config: &Config,
        repo: Arc<dyn UserRepository>,
    ) -> Result<Self, AppError> {
        let store = CredentialStore::new(repo, config.bcrypt_cost).await?;
        let keys = TokenKeys::new(&config.jwt_secret, config.token_ttl);
        Ok(Self::new(store, keys))
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Validates the input and creates a user.
    ///
    /// Invalid input is rejected before the store is touched.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<UserRecord, AppError> {
        let input = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: raw_password.to_string(),
        }
        .trimmed();
        input.validate()?;

        let user = self
            .store
            .create_user(&input.name, &input.email, &input.password)
            .await?;
        log::info!("registered user {}", user.id);
        Ok(user)
    }

    /// Checks credentials and mints a signed token for the user.
    ///
    /// An unknown email and a wrong password both yield
    /// [`AppError::InvalidCredentials`] after the same amount of hashing work.
    pub async fn login(&self, email: &str, raw_password: &str) -> Result<String, AppError> {
        match self
            .store
            .verify_credentials(email, raw_password.trim())
            .await?
        {
            Some(user) => {
                let token = self.keys.issue(user.id)?;
                log::info!("user {} logged in", user.id);
                Ok(token)
            }
            None => {
                log::warn!("rejected login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Resolves a presented token to its user. No side effects.
    pub async fn validate(&self, token: &str) -> Result<UserRecord, AppError> {
        self.validate_at(token, Utc::now()).await
    }

    /// Like [`validate`](Self::validate), with expiry judged at `now`.
    pub async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, AppError> {
        let claims = self.keys.verify_at(token, now).map_err(|e| {
            if let AppError::Unauthorized(reason) = &e {
                log::debug!("token rejected: {}", reason);
            }
            e
        })?;

        match self.store.find_by_id(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                log::debug!("token rejected: subject {} not found", claims.sub);
                Err(AppError::Unauthorized(TokenRejection::UnknownSubject))
            }
        }
    }

    /// Mints a token at an explicit instant. Used to exercise expiry.
    pub fn issue_token_at(
        &self,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        self.keys.issue_at(user.id, now)
    }
}
