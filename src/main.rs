use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use taskauth::{
    auth::{AuthMiddleware, AuthService},
    config::Config,
    error::AppError,
    routes::{self, health},
    store::{InMemoryUserRepository, PgUserRepository, UserRepository},
};

fn startup_error(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    log::error!("startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err)
}

async fn build_repository(config: &Config) -> Result<Arc<dyn UserRepository>, AppError> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let repo = PgUserRepository::new(pool);
            repo.migrate().await?;
            log::info!("using postgres credential store");
            Ok(Arc::new(repo))
        }
        None => {
            log::warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Refuses to start without a signing secret.
    let config = Config::from_env().map_err(startup_error)?;
    let repo = build_repository(&config).await.map_err(startup_error)?;
    let auth = web::Data::new(
        AuthService::from_config(&config, repo)
            .await
            .map_err(startup_error)?,
    );

    log::info!("Starting taskauth server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
