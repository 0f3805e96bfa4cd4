//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, rentals};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentrack API",
        version = "0.1.0",
        description = "Equipment Rental Tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::create_equipment,
        equipment::get_equipment,
        equipment::checkout_equipment,
        equipment::return_equipment,
        equipment::schedule_maintenance,
        equipment::list_available,
        equipment::search_equipment,
        // Rentals
        rentals::list_overdue,
        rentals::get_user_rentals,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::enums::EquipmentStatus,
            crate::models::enums::EquipmentCondition,
            // Rentals
            crate::models::rental::Rental,
            crate::models::enums::RentalStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment registration and rental lifecycle"),
        (name = "rentals", description = "Rental reporting")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
