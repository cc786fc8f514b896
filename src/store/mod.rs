//! # Credential Store
//!
//! Owns user records: identity plus a salted bcrypt hash of the password.
//! Persistence is delegated to a [`UserRepository`]; this module decides how
//! emails are normalized and how passwords are hashed and checked, so no
//! caller outside it ever sees a hash.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::AppError;
use crate::models::{NewUser, StoredUser, UserRecord};

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

/// Persistence backend for user rows.
///
/// `insert` must enforce email uniqueness atomically: when two inserts race
/// on the same email, exactly one succeeds and the other gets
/// [`AppError::DuplicateEmail`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<StoredUser, AppError>;
    /// `email` is already normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AppError>;
}

/// Canonical form used for storage and uniqueness: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Hashed once per store so unknown-email logins pay for a real verification.
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
    dummy_hash: String,
}

impl CredentialStore {
    pub async fn new(repo: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password(DUMMY_PASSWORD, bcrypt_cost).await?;
        Ok(Self {
            repo,
            bcrypt_cost,
            dummy_hash,
        })
    }

    /// Hashes `raw_password` and persists a new user.
    ///
    /// Fails with [`AppError::DuplicateEmail`] if the normalized email is taken.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<UserRecord, AppError> {
        let password_hash = hash_password(raw_password, self.bcrypt_cost).await?;
        let stored = self
            .repo
            .insert(NewUser {
                name: name.trim().to_string(),
                email: normalize_email(email),
                password_hash,
            })
            .await?;
        Ok(stored.to_record())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let stored = self.repo.find_by_email(&normalize_email(email)).await?;
        Ok(stored.as_ref().map(StoredUser::to_record))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let stored = self.repo.find_by_id(id).await?;
        Ok(stored.as_ref().map(StoredUser::to_record))
    }

    /// Returns the user only if `raw_password` matches the stored hash.
    ///
    /// Exactly one bcrypt verification runs whether or not the email exists.
    pub(crate) async fn verify_credentials(
        &self,
        email: &str,
        raw_password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let stored = self.repo.find_by_email(&normalize_email(email)).await?;

        match stored {
            Some(user) => {
                // bcrypt only sees the first 72 bytes; longer input never matches.
                let matches = verify_password(raw_password, &user.password_hash).await?;
                if matches && raw_password.len() <= MAX_PASSWORD_BYTES {
                    Ok(Some(user.to_record()))
                } else {
                    log::debug!("password mismatch for user {}", user.id);
                    Ok(None)
                }
            }
            None => {
                verify_password(raw_password, &self.dummy_hash).await?;
                log::debug!("login attempted for unknown email");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(InMemoryUserRepository::new()), 4)
            .await
            .unwrap()
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@B.com "), "a@b.com");
        assert_eq!(normalize_email("ada@example.com"), "ada@example.com");
    }

    #[actix_rt::test]
    async fn test_create_and_find_user() {
        let store = store().await;
        let created = store
            .create_user(" Ada ", " Ada@Example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(created.name, "Ada");
        assert_eq!(created.email, "ada@example.com");

        let by_email = store.find_by_email("ADA@example.com ").await.unwrap();
        assert_eq!(by_email, Some(created.clone()));

        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));

        assert_eq!(store.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_duplicate_email_variants_rejected() {
        let store = store().await;
        store.create_user("A", "A@B.com", "secret1").await.unwrap();

        let err = store
            .create_user("B", " a@b.com ", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[actix_rt::test]
    async fn test_verify_credentials() {
        let store = store().await;
        let created = store
            .create_user("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        let ok = store
            .verify_credentials("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(created.id));

        assert_eq!(
            store
                .verify_credentials("ada@example.com", "wrong")
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            store
                .verify_credentials("nobody@example.com", "secret1")
                .await
                .unwrap(),
            None
        );
    }

    #[actix_rt::test]
    async fn test_bytes_past_bcrypt_limit_do_not_match() {
        let store = store().await;
        let at_limit = "p".repeat(MAX_PASSWORD_BYTES);
        store
            .create_user("Ada", "ada@example.com", &at_limit)
            .await
            .unwrap();

        assert!(store
            .verify_credentials("ada@example.com", &at_limit)
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            store
                .verify_credentials("ada@example.com", &format!("{}extra", at_limit))
                .await
                .unwrap(),
            None
        );
    }

    #[actix_rt::test]
    async fn test_unknown_email_verifies_against_dummy_hash() {
        let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let seeded = store().await;
        let known = CredentialStore {
            repo: repo.clone(),
            ..seeded
        };
        known
            .create_user("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        // An unparseable dummy hash only fails if the unknown-email branch verifies it.
        let broken = CredentialStore {
            repo,
            bcrypt_cost: 4,
            dummy_hash: "not-a-bcrypt-hash".to_string(),
        };

        match broken.verify_credentials("nobody@example.com", "secret1").await {
            Err(AppError::Internal(_)) => {}
            other => panic!("expected dummy verification to fail, got {:?}", other),
        }

        let ok = broken
            .verify_credentials("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.email), Some("ada@example.com".to_string()));
    }
}
