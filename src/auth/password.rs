use crate::error::AppError;
use actix_web::web;

/// Hashes `password` with bcrypt at `cost` on the blocking thread pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = web::block(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Checks `password` against a bcrypt hash on the blocking thread pool.
///
/// bcrypt compares the derived hash bytes in constant time.
pub async fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hashed_password = hashed_password.to_owned();
    let matches = web::block(move || bcrypt::verify(password, &hashed_password)).await??;
    Ok(matches)
}
