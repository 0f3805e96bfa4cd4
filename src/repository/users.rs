//! Users repository: borrower lookup

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BorrowerDirectory;
use crate::{
    error::{AppError, AppResult},
    models::Borrower,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Borrower> {
        sqlx::query_as::<_, Borrower>(
            "SELECT id, login, firstname, lastname FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}

#[async_trait]
impl BorrowerDirectory for UsersRepository {
    async fn resolve(&self, user_id: i64) -> AppResult<Borrower> {
        self.get_by_id(user_id).await
    }
}
