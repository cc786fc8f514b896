pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use service::AuthService;
pub use token::{Claims, TokenKeys};

pub const MIN_PASSWORD_LENGTH: usize = 6;
/// bcrypt ignores everything past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    static ref DIGIT_REGEX: regex::Regex = regex::Regex::new(r"\d").unwrap();
    // Domain must carry a top-level label, so `a@b` is rejected.
    static ref EMAIL_DOMAIN_REGEX: regex::Regex =
        regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap();
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Name is required".into());
        return Err(err);
    }
    if DIGIT_REGEX.is_match(name) {
        let mut err = ValidationError::new("digits");
        err.message = Some("Name must not contain digits".into());
        return Err(err);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().chars().count() < MIN_PASSWORD_LENGTH {
        let mut err = ValidationError::new("length");
        err.message = Some(
            format!(
                "Password should be {} or more characters",
                MIN_PASSWORD_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    if password.trim().len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("length");
        err.message = Some(
            format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    if EMAIL_DOMAIN_REGEX.is_match(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Please include a valid email".into());
        Err(err)
    }
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name. Must be non-empty and contain no digits.
    #[validate(custom = "validate_name")]
    pub name: String,
    /// Email address for the new account.
    #[validate(
        email(message = "Please include a valid email"),
        custom = "validate_email_domain"
    )]
    pub email: String,
    /// At least 6 characters and at most 72 bytes after trimming.
    #[validate(custom = "validate_password")]
    pub password: String,
}

impl RegisterRequest {
    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}

/// Represents the payload for a user login request.
///
/// Not shape-validated: any failure surfaces as invalid credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after a successful login. The token is opaque to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
