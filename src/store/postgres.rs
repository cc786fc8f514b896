use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::UserRepository;
use crate::error::AppError;
use crate::models::{NewUser, StoredUser};

/// Postgres-backed user storage. Uniqueness of `email` is enforced by the
/// `users_email_key` unique index (see `migrations/`).
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<StoredUser, AppError> {
        let stored = user.into_stored();

        let result = sqlx::query_as::<_, StoredUser>(
            "INSERT INTO users (id, name, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, password_hash, created_at",
        )
        .bind(stored.id)
        .bind(&stored.name)
        .bind(&stored.email)
        .bind(&stored.password_hash)
        .bind(stored.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AppError> {
        let user = sqlx::query_as::<_, StoredUser>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AppError> {
        let user = sqlx::query_as::<_, StoredUser>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
