//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by the credential
//! store, the auth service, and the HTTP handlers.
//!
//! Each variant maps to a stable error kind (see [`AppError::kind`]) and an HTTP
//! status. Messages returned to callers never carry storage details or the reason a
//! token was rejected; those are only logged.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Why a bearer token was rejected. Only ever logged, never shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No `Authorization: Bearer` header was presented.
    Missing,
    /// The token could not be parsed as a signed token.
    Malformed,
    /// The signature did not verify against the signing secret.
    BadSignature,
    /// The token carried an expiry that has passed.
    Expired,
    /// The token verified but its subject no longer resolves to a user.
    UnknownSubject,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            TokenRejection::Missing => "missing token",
            TokenRejection::Malformed => "malformed token",
            TokenRejection::BadSignature => "bad signature",
            TokenRejection::Expired => "expired token",
            TokenRejection::UnknownSubject => "unknown subject",
        };
        f.write_str(reason)
    }
}

/// Represents all errors surfaced by the credential subsystem.
#[derive(Debug)]
pub enum AppError {
    /// Input failed a field-level rule (HTTP 422). Safe to show verbatim.
    Validation { field: String, message: String },
    /// Registration attempted with an email that is already taken (HTTP 409).
    DuplicateEmail,
    /// Login failed. Deliberately silent about whether the email or the
    /// password was wrong (HTTP 401).
    InvalidCredentials,
    /// A protected call presented no usable token (HTTP 401).
    Unauthorized(TokenRejection),
    /// Malformed request body (HTTP 400).
    BadRequest(String),
    /// Storage, hashing, or signing failed unexpectedly (HTTP 500).
    /// The detail is logged, never returned.
    Internal(String),
}

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing token";

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// The message shown to callers.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::DuplicateEmail => "Email already registered".to_string(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AppError::Unauthorized(_) => UNAUTHORIZED_MESSAGE.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation { field, message } => {
                write!(f, "Validation Error: {}: {}", field, message)
            }
            AppError::DuplicateEmail => write!(f, "Duplicate Email"),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Unauthorized(reason) => write!(f, "Unauthorized: {}", reason),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("internal error: {}", detail);
        }
        let mut body = json!({
            "error": self.kind(),
            "message": self.public_message(),
        });
        if let AppError::Validation { field, .. } = self {
            body["field"] = json!(field);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Unique violations are handled by the store; anything reaching this
/// conversion is an infrastructure failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::Internal(format!("database error: {}", error))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::Internal(format!("migration error: {}", error))
    }
}

/// Reports the first failing field. Fields are visited in sorted order so the
/// same input always yields the same error.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().copied().collect();
        fields.sort_unstable();

        match fields.first() {
            Some(field) => {
                let message = field_errors[field]
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(*field, message)
            }
            None => AppError::validation("input", "Invalid input"),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::Internal(format!("blocking task failed: {}", error))
    }
}
