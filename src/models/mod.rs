//! Data models for Rentrack

pub mod enums;
pub mod equipment;
pub mod rental;
pub mod user;

// Re-export commonly used types
pub use enums::{EquipmentCondition, EquipmentStatus, RentalStatus};
pub use equipment::{CreateEquipment, Equipment, NewEquipment};
pub use rental::{NewRental, Rental};
pub use user::Borrower;
