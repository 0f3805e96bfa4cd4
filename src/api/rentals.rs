//! Rental reporting endpoints

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    api::extract::{ApiPath, ApiQuery},
    error::AppResult,
    models::rental::{OverdueQuery, Rental},
};

/// List overdue rentals
#[utoipa::path(
    get,
    path = "/equipment/rentals/overdue",
    tag = "rentals",
    params(OverdueQuery),
    responses(
        (status = 200, description = "Active rentals past their expected return date", body = Vec<Rental>)
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<OverdueQuery>,
) -> AppResult<Json<Vec<Rental>>> {
    let now = query.now.unwrap_or_else(Utc::now);
    let rentals = state.services.inventory.list_overdue(now).await?;
    Ok(Json(rentals))
}

/// Get rentals for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/rentals",
    tag = "rentals",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's rentals, newest first", body = Vec<Rental>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_rentals(
    State(state): State<crate::AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state.services.inventory.rentals_for_user(user_id).await?;
    Ok(Json(rentals))
}
