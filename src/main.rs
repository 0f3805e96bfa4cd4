//! Rentrack Server - Equipment Rental Tracking
//!
//! REST API server for the equipment rental lifecycle.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use rentrack_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{RentalRules, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("rentrack_server={},tower_http=debug", config.logging.level).into()
    });
    let (writer, _writer_guard) = tracing_appender::non_blocking(std::io::stdout());
    let fmt_layer = match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        _ => tracing_subscriber::fmt::layer().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Starting Rentrack Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    // Create repository and services
    let repository = Repository::new(pool, config.database.lock_timeout_ms);
    let borrowers = Arc::new(repository.users.clone());
    let services = Services::new(
        Arc::new(repository),
        borrowers,
        RentalRules::from(&config.rentals),
    );

    // Create application state
    let state = AppState {
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
