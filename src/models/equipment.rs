//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{EquipmentCondition, EquipmentStatus};

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Globally unique serial number
    pub serial_number: String,
    pub purchase_date: DateTime<Utc>,
    pub condition: EquipmentCondition,
    pub current_status: EquipmentStatus,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Register equipment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category must be 1 to 100 characters"))]
    pub category: String,
    #[validate(length(min = 1, max = 100, message = "Serial number must be 1 to 100 characters"))]
    pub serial_number: String,
    /// Defaults to the registration time
    pub purchase_date: Option<DateTime<Utc>>,
    /// Defaults to EXCELLENT
    pub condition: Option<EquipmentCondition>,
    /// Ignored: new equipment always starts AVAILABLE
    pub current_status: Option<EquipmentStatus>,
    pub notes: Option<String>,
}

/// Equipment row to insert, with every field resolved
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub name: String,
    pub category: String,
    pub serial_number: String,
    pub purchase_date: DateTime<Utc>,
    pub condition: EquipmentCondition,
    pub current_status: EquipmentStatus,
    pub notes: Option<String>,
}

/// Equipment search query
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Exact category to match; all equipment when absent
    pub category: Option<String>,
}
