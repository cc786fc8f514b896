use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user as seen outside the credential store.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    /// Trimmed and lowercased.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The externally visible projection of a [`UserRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A user row as persisted, hash included. Only the credential store and its
/// repositories handle this type.
#[derive(Debug, Clone, FromRow)]
pub struct StoredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// A user about to be inserted. `email` is already normalized and
/// `password_hash` already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Assigns an identifier and creation time.
    pub fn into_stored(self) -> StoredUser {
        StoredUser {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_omits_hash_and_timestamp() {
        let stored = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
        }
        .into_stored();

        let json = serde_json::to_value(UserView::from(stored.to_record())).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["name"], "Ada");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("created_at").is_none());
    }
}
