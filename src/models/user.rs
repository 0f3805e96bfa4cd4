//! Borrower identity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A user who can borrow equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: i64,
    pub login: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}
