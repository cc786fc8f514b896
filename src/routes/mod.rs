pub mod auth;
pub mod health;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

/// Routes mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::current_user),
    );
}

/// Malformed or incomplete JSON bodies become `AppError::BadRequest`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}
