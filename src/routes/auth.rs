use crate::{
    auth::{AuthService, AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse},
    error::AppError,
    models::UserView,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Returns the created user's public view. Does not log the user in.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = auth
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Login user
///
/// Verifies credentials and returns a bearer token.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let token = auth.login(&payload.email, &payload.password).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Current user
///
/// Returns the user the presented token resolves to.
#[get("/user")]
pub async fn current_user(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserView::from(user.0)))
}
