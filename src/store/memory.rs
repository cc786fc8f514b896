use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserRepository;
use crate::error::AppError;
use crate::models::{NewUser, StoredUser};

#[derive(Default)]
struct Tables {
    by_id: HashMap<Uuid, StoredUser>,
    /// normalized email -> id
    email_index: HashMap<String, Uuid>,
}

/// Process-local user storage, used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<StoredUser, AppError> {
        // Check and insert under one write guard.
        let mut tables = self.tables.write().await;
        if tables.email_index.contains_key(&user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let stored = user.into_stored();
        tables.email_index.insert(stored.email.clone(), stored.id);
        tables.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .email_index
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, AppError> {
        Ok(self.tables.read().await.by_id.get(&id).cloned())
    }
}
