//! Rental ledger: rental rows, no business rules

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{NewRental, Rental, RentalStatus},
};

#[derive(Clone)]
pub struct RentalLedger {
    pool: Pool<Postgres>,
}

impl RentalLedger {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get rentals for a user, newest first
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, Rental>(
            "SELECT * FROM rentals WHERE user_id = $1 ORDER BY checkout_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active rentals past their expected return date
    pub async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rentals
            WHERE status = $1 AND expected_return_date < $2
            ORDER BY expected_return_date, id
            "#,
        )
        .bind(RentalStatus::Active)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Create a rental
pub async fn insert(conn: &mut PgConnection, rental: &NewRental) -> AppResult<Rental> {
    let row = sqlx::query_as::<_, Rental>(
        r#"
        INSERT INTO rentals (
            equipment_id, user_id, checkout_date, expected_return_date,
            status, notes, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $3)
        RETURNING *
        "#,
    )
    .bind(rental.equipment_id)
    .bind(rental.user_id)
    .bind(rental.checkout_date)
    .bind(rental.expected_return_date)
    .bind(RentalStatus::Active)
    .bind(&rental.notes)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

/// The active rental for a piece of equipment, if any
pub async fn find_active_by_equipment(
    conn: &mut PgConnection,
    equipment_id: i64,
) -> AppResult<Option<Rental>> {
    let row = sqlx::query_as::<_, Rental>(
        "SELECT * FROM rentals WHERE equipment_id = $1 AND status = $2 FOR UPDATE",
    )
    .bind(equipment_id)
    .bind(RentalStatus::Active)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Write back status, actual return date and notes
pub async fn update(conn: &mut PgConnection, rental: &Rental) -> AppResult<Rental> {
    sqlx::query_as::<_, Rental>(
        r#"
        UPDATE rentals
        SET status = $1, actual_return_date = $2, notes = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(rental.status)
    .bind(rental.actual_return_date)
    .bind(&rental.notes)
    .bind(rental.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Rental {} not found", rental.id)))
}
