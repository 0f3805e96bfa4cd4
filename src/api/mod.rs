//! API handlers for Rentrack REST endpoints

pub mod equipment;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod rentals;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Equipment lifecycle
        .route("/equipment", post(equipment::create_equipment))
        .route("/equipment/checkout", post(equipment::checkout_equipment))
        .route("/equipment/return", post(equipment::return_equipment))
        .route("/equipment/available", get(equipment::list_available))
        .route("/equipment/search", get(equipment::search_equipment))
        .route("/equipment/:id", get(equipment::get_equipment))
        .route(
            "/equipment/:id/maintenance",
            post(equipment::schedule_maintenance),
        )
        // Rentals
        .route("/equipment/rentals/overdue", get(rentals::list_overdue))
        .route("/users/:id/rentals", get(rentals::get_user_rentals))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
