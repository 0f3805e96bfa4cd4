//! Equipment API endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::extract::{ApiJson, ApiPath, ApiQuery},
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, SearchQuery},
        rental::{CheckoutQuery, ReturnQuery},
    },
};

/// Register equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment registered (status AVAILABLE)", body = Equipment),
        (status = 400, description = "Invalid equipment fields"),
        (status = 409, description = "Serial number already registered")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    ApiJson(data): ApiJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let equipment = state.services.inventory.register(data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.inventory.get_equipment(id).await?;
    Ok(Json(equipment))
}

/// Check out equipment to a borrower
#[utoipa::path(
    post,
    path = "/equipment/checkout",
    tag = "equipment",
    params(CheckoutQuery),
    responses(
        (status = 200, description = "Equipment checked out", body = bool),
        (status = 400, description = "Invalid return date"),
        (status = 404, description = "Equipment or user not found"),
        (status = 409, description = "Equipment not available")
    )
)]
pub async fn checkout_equipment(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<CheckoutQuery>,
) -> AppResult<Json<bool>> {
    state
        .services
        .inventory
        .checkout(query.equipment_id, query.user_id, query.return_date, query.notes)
        .await?;
    Ok(Json(true))
}

/// Return checked-out equipment
#[utoipa::path(
    post,
    path = "/equipment/return",
    tag = "equipment",
    params(ReturnQuery),
    responses(
        (status = 200, description = "Equipment returned", body = bool),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "No active rental for this equipment")
    )
)]
pub async fn return_equipment(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<ReturnQuery>,
) -> AppResult<Json<bool>> {
    state
        .services
        .inventory
        .return_equipment(query.equipment_id, query.condition)
        .await?;
    Ok(Json(true))
}

/// Schedule maintenance
#[utoipa::path(
    post,
    path = "/equipment/{equipment_id}/maintenance",
    tag = "equipment",
    params(("equipment_id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment moved to maintenance", body = bool),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment is checked out")
    )
)]
pub async fn schedule_maintenance(
    State(state): State<crate::AppState>,
    ApiPath(equipment_id): ApiPath<i64>,
) -> AppResult<Json<bool>> {
    state
        .services
        .inventory
        .schedule_maintenance(equipment_id)
        .await?;
    Ok(Json(true))
}

/// List available equipment
#[utoipa::path(
    get,
    path = "/equipment/available",
    tag = "equipment",
    responses(
        (status = 200, description = "Equipment with status AVAILABLE", body = Vec<Equipment>)
    )
)]
pub async fn list_available(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.inventory.list_available().await?;
    Ok(Json(equipment))
}

/// Search equipment by category
#[utoipa::path(
    get,
    path = "/equipment/search",
    tag = "equipment",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching equipment", body = Vec<Equipment>)
    )
)]
pub async fn search_equipment(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state
        .services
        .inventory
        .search(query.category.as_deref())
        .await?;
    Ok(Json(equipment))
}
