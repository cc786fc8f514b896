use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::{AppError, TokenRejection};
use crate::models::UserRecord;

/// The user resolved by `AuthMiddleware` for the current request.
///
/// Only usable on routes behind `AuthMiddleware`; anywhere else it rejects
/// with `Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserRecord);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserRecord>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => ready(Err(AppError::Unauthorized(TokenRejection::Missing).into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::Utc;
    use uuid::Uuid;

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_success() {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: Utc::now(),
        };
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(user.clone());

        let mut payload = Payload::None;
        let extracted = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(extracted.0, user);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = AuthenticatedUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
