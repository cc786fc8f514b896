use actix_web::{get, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness report. Never consults the credential store, so it answers even
/// when the database is unreachable.
#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
    service: &'static str,
    timestamp: DateTime<Utc>,
}

/// `GET /health`, reachable without a bearer token.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(Liveness {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        timestamp: Utc::now(),
    })
}
