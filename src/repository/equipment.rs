//! Equipment registry: equipment rows, no business rules

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Equipment, EquipmentStatus, NewEquipment},
};

#[derive(Clone)]
pub struct EquipmentRegistry {
    pool: Pool<Postgres>,
}

impl EquipmentRegistry {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List equipment in the given status
    pub async fn list_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE current_status = $1 ORDER BY name, id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// List equipment with an exact category match
    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE category = $1 ORDER BY name, id",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Insert equipment
pub async fn insert(conn: &mut PgConnection, data: &NewEquipment) -> AppResult<Equipment> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Equipment>(
        r#"
        INSERT INTO equipment (
            name, category, serial_number, purchase_date, condition,
            current_status, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.serial_number)
    .bind(data.purchase_date)
    .bind(data.condition)
    .bind(data.current_status)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// Read equipment and lock its row until the transaction ends
pub async fn lock(conn: &mut PgConnection, id: i64) -> AppResult<Option<Equipment>> {
    let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Write back status, condition, maintenance date and notes
pub async fn update(conn: &mut PgConnection, data: &Equipment) -> AppResult<Equipment> {
    sqlx::query_as::<_, Equipment>(
        r#"
        UPDATE equipment
        SET current_status = $1, condition = $2, last_maintenance_date = $3,
            notes = $4, updated_at = $5
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(data.current_status)
    .bind(data.condition)
    .bind(data.last_maintenance_date)
    .bind(&data.notes)
    .bind(Utc::now())
    .bind(data.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", data.id)))
}
