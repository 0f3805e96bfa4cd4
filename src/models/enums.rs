//! Status and condition enums, and the transitions between them

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Implements string conversions and TEXT column mapping for a unit enum.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($ty), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

/// Where a piece of equipment currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    CheckedOut,
    Maintenance,
}

text_enum!(EquipmentStatus {
    Available => "AVAILABLE",
    CheckedOut => "CHECKED_OUT",
    Maintenance => "MAINTENANCE",
});

impl EquipmentStatus {
    /// Status after a checkout, or `None` when checkout is not allowed
    pub fn after_checkout(self) -> Option<Self> {
        match self {
            EquipmentStatus::Available => Some(EquipmentStatus::CheckedOut),
            EquipmentStatus::CheckedOut | EquipmentStatus::Maintenance => None,
        }
    }

    /// Status after maintenance is scheduled, or `None` when an active rental forbids it
    pub fn after_maintenance_scheduled(self) -> Option<Self> {
        match self {
            EquipmentStatus::Available | EquipmentStatus::Maintenance => {
                Some(EquipmentStatus::Maintenance)
            }
            EquipmentStatus::CheckedOut => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EquipmentCondition
// ---------------------------------------------------------------------------

/// Physical condition, as assessed at registration or return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentCondition {
    Excellent,
    Good,
    NeedsMaintenance,
}

text_enum!(EquipmentCondition {
    Excellent => "EXCELLENT",
    Good => "GOOD",
    NeedsMaintenance => "NEEDS_MAINTENANCE",
});

impl EquipmentCondition {
    /// Equipment status once returned in this condition
    pub fn status_after_return(self) -> EquipmentStatus {
        match self {
            EquipmentCondition::Excellent | EquipmentCondition::Good => EquipmentStatus::Available,
            EquipmentCondition::NeedsMaintenance => EquipmentStatus::Maintenance,
        }
    }

    /// Terminal status of a rental returned in this condition
    pub fn closing_rental_status(self) -> RentalStatus {
        match self {
            EquipmentCondition::Excellent | EquipmentCondition::Good => RentalStatus::Returned,
            EquipmentCondition::NeedsMaintenance => RentalStatus::Damaged,
        }
    }
}

// ---------------------------------------------------------------------------
// RentalStatus
// ---------------------------------------------------------------------------

/// Rental status; every status other than `Active` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    Active,
    Returned,
    Damaged,
}

text_enum!(RentalStatus {
    Active => "ACTIVE",
    Returned => "RETURNED",
    Damaged => "DAMAGED",
});

impl RentalStatus {
    pub fn is_active(self) -> bool {
        match self {
            RentalStatus::Active => true,
            RentalStatus::Returned | RentalStatus::Damaged => false,
        }
    }
}
