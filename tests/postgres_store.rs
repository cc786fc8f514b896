//! Runs against a live database. Skipped unless `DATABASE_URL` is set.

use std::sync::Arc;

use futures::future::join_all;
use pretty_assertions::assert_eq;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use taskauth::error::AppError;
use taskauth::models::NewUser;
use taskauth::store::{CredentialStore, PgUserRepository, UserRepository};
use uuid::Uuid;

const TEST_COST: u32 = 4;

async fn repository() -> Option<(PgPool, PgUserRepository)> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping Postgres store test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    let repo = PgUserRepository::new(pool.clone());
    repo.migrate().await.expect("migrate");
    Some((pool, repo))
}

async fn delete_user(pool: &PgPool, email: &str) {
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await
        .expect("cleanup");
}

#[actix_rt::test]
async fn test_concurrent_inserts_same_email() {
    let Some((pool, repo)) = repository().await else {
        return;
    };
    let repo = Arc::new(repo);
    let email = format!("race-{}@example.com", Uuid::new_v4().simple());

    let attempts = (0..8).map(|i| {
        let repo = repo.clone();
        let email = email.clone();
        async move {
            repo.insert(NewUser {
                name: format!("Racer {}", i),
                email,
                password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
            })
            .await
        }
    });
    let results = join_all(attempts).await;
    delete_user(&pool, &email).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::DuplicateEmail)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
}

#[actix_rt::test]
async fn test_store_persists_normalized_email() {
    let Some((pool, repo)) = repository().await else {
        return;
    };
    let store = CredentialStore::new(Arc::new(repo), TEST_COST)
        .await
        .expect("store");
    let local = Uuid::new_v4().simple().to_string();
    let normalized = format!("ada-{}@example.com", local);

    // The schema rejects non-normalized emails; this insert passes only if
    // the store normalizes before writing.
    let created = store
        .create_user("Ada", &format!("  Ada-{}@Example.COM ", local.to_uppercase()), "secret1")
        .await;
    let found = store.find_by_email(&normalized).await;
    let duplicate = store
        .create_user("Bob", &normalized.to_uppercase(), "secret2")
        .await;
    delete_user(&pool, &normalized).await;

    let created = created.expect("create_user");
    assert_eq!(created.email, normalized);
    assert_eq!(found.expect("find_by_email").map(|u| u.id), Some(created.id));
    assert!(matches!(duplicate, Err(AppError::DuplicateEmail)));
}

#[actix_rt::test]
async fn test_unnormalized_row_violates_schema() {
    let Some((pool, repo)) = repository().await else {
        return;
    };
    let email = format!("Mixed-{}@Example.com", Uuid::new_v4().simple());

    let result = repo
        .insert(NewUser {
            name: "Ada".to_string(),
            email: email.clone(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
        })
        .await;
    delete_user(&pool, &email).await;

    match result {
        Err(AppError::Internal(_)) => {}
        other => panic!("expected CHECK violation, got {:?}", other),
    }
}
