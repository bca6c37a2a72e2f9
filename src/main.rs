use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use marketplace_backend::auth::jwt::TokenVerifier;
use marketplace_backend::config::{AppConfig, AuthConfig};
use marketplace_backend::storage::LocalBlobStore;
use marketplace_backend::{AppState, create_pool, handlers};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    tracing::info!("Connected to the database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        tracing::info!("Migrations applied");
    }

    match &config.auth {
        AuthConfig::SharedSecret(_) => tracing::info!("Verifying tokens with a shared secret"),
        AuthConfig::Jwks { url } => tracing::info!("Verifying tokens against JWKS at {url}"),
    }
    let verifier = TokenVerifier::from_config(&config.auth);

    std::fs::create_dir_all(&config.media_root)?;
    let blob_store = Arc::new(LocalBlobStore::new(config.media_root.clone()));

    let state = AppState::new(db, verifier, config.policy, blob_store);
    let media_url = config.media_url.clone();
    let media_root = config.media_root.clone();

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .configure(|cfg| state.register(cfg))
            .service(web::scope("/api").configure(handlers::init_routes))
            .service(Files::new(&media_url, media_root.clone()))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
