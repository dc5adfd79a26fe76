use actix_cors::Cors;
use actix_web::{App, HttpServer};
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod error;
mod models;
mod openapi;
mod repo;
mod routes;

use openapi::ApiDoc;
#[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
use repo::inmem::InMemRepo;
use routes::{config, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()

const DEFAULT_PORT: u16 = 5000;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Environment variables must be set externally (shell, systemd, Docker, etc.)
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    validate_env_vars();

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping bidboard server");

    #[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
    let repo = InMemRepo::new();
    #[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
    info!("Using in-memory repository backend");

    #[cfg(feature = "postgres-store")]
    let repo = {
        use sqlx::postgres::PgPoolOptions;
        let db_url = database_url();
        // Lazy pool: a down database never blocks startup, requests surface
        // connection errors as 500s instead.
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(&db_url)
            .expect("Failed to create Pg pool");
        info!("Using Postgres repository backend");
        crate::repo::pg::PgRepo::new(pool)
    };

    let openapi = ApiDoc::openapi();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let server = HttpServer::new(move || {
        // Session cookies ride on credentialed cross-origin requests, so the
        // origin list stays a fixed allow-list rather than a wildcard.
        let cors = {
            let mut c = Cors::default()
                .allowed_origin("https://bidboard.web.app")
                .allowed_origin("https://bidboard.firebaseapp.com")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                .supports_credentials()
                .max_age(3600);
            // If FRONTEND_URL env var is provided and not already covered, add it.
            if let Ok(front) = std::env::var("FRONTEND_URL") {
                c = c.allowed_origin(&front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(config)
            .service(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi.clone()))
            .app_data(actix_web::web::Data::new(AppState {
                repo: Arc::new(repo.clone()),
            }))
    })
    .bind(("0.0.0.0", port))?;

    info!("Listening on http://0.0.0.0:{port}");

    server.run().await
}

/// Validate that required environment variables are set
fn validate_env_vars() {
    use std::env;

    let required = vec!["ACCESS_TOKEN_SECRET"];

    let mut missing = Vec::new();
    for var in required {
        if env::var(var).is_err() {
            missing.push(var);
        }
    }

    if !missing.is_empty() {
        eprintln!("Missing required environment variables: {:?}", missing);
        eprintln!("Please copy .env.example to .env and configure it");
        std::process::exit(1);
    }

    if let Ok(secret) = env::var("ACCESS_TOKEN_SECRET") {
        if secret.len() < 32 {
            eprintln!("ACCESS_TOKEN_SECRET must be at least 32 characters long for security");
            std::process::exit(1);
        }
    }

    #[cfg(feature = "postgres-store")]
    if env::var("DB_USER").is_err() || env::var("DB_PASS").is_err() {
        eprintln!("Warning: DB_USER/DB_PASS not set; falling back to postgres defaults");
    }
}

#[cfg(feature = "postgres-store")]
fn database_url() -> String {
    let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let pass = std::env::var("DB_PASS").unwrap_or_default();
    let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let name = std::env::var("DB_NAME").unwrap_or_else(|_| "bidboard".to_string());
    format!("postgres://{user}:{pass}@{host}/{name}")
}
