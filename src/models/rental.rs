//! Rental model and related request types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{EquipmentCondition, RentalStatus};

/// Rental record, one per checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: i64,
    pub equipment_id: i64,
    /// Borrower
    pub user_id: i64,
    pub checkout_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    /// Set only once the rental is closed
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: RentalStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rental {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.expected_return_date < now
    }
}

/// Rental row to insert
#[derive(Debug, Clone)]
pub struct NewRental {
    pub equipment_id: i64,
    pub user_id: i64,
    pub checkout_date: DateTime<Utc>,
    pub expected_return_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Checkout query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CheckoutQuery {
    pub equipment_id: i64,
    /// Borrower ID
    pub user_id: i64,
    /// Expected return date (RFC 3339, or ISO local date-time read as UTC)
    #[serde(deserialize_with = "deserialize_timestamp")]
    #[param(value_type = String)]
    pub return_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Return query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReturnQuery {
    pub equipment_id: i64,
    /// Condition observed at return
    pub condition: EquipmentCondition,
}

/// Overdue report query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverdueQuery {
    /// Reference instant; defaults to the current time
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[param(value_type = Option<String>)]
    pub now: Option<DateTime<Utc>>,
}

/// Parse an RFC 3339 timestamp, falling back to a zone-less local date-time taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("Invalid timestamp: {}", value))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
