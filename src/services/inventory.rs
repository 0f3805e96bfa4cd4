//! Inventory coordinator: the equipment/rental state machine
//!
//! Every write below runs inside one unit of work that locks the equipment
//! row before reading its status, so status and rental records always change
//! together. Rejected transitions drop the unit of work without committing.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::{
    config::{RentalsConfig, MAX_RENTAL_DAYS},
    error::{AppError, AppResult},
    models::{
        CreateEquipment, Equipment, EquipmentCondition, EquipmentStatus, NewEquipment, NewRental,
        Rental,
    },
    repository::{BorrowerDirectory, InventoryStore},
};

/// Limits applied to caller-supplied rental dates
#[derive(Debug, Clone, Copy)]
pub struct RentalRules {
    pub max_duration: Duration,
}

impl RentalRules {
    /// Expected return must be strictly after checkout and within the maximum duration
    pub fn validate_expected_return(
        &self,
        checkout: DateTime<Utc>,
        expected_return: DateTime<Utc>,
    ) -> AppResult<()> {
        if expected_return <= checkout {
            return Err(AppError::Validation(
                "Expected return date must be after the checkout date".to_string(),
            ));
        }
        if expected_return - checkout > self.max_duration {
            return Err(AppError::Validation(format!(
                "Expected return date must be within {} days of checkout",
                self.max_duration.num_days()
            )));
        }
        Ok(())
    }
}

impl From<&RentalsConfig> for RentalRules {
    fn from(config: &RentalsConfig) -> Self {
        Self {
            max_duration: Duration::days(config.max_duration_days.clamp(1, MAX_RENTAL_DAYS)),
        }
    }
}

impl Default for RentalRules {
    fn default() -> Self {
        Self::from(&RentalsConfig::default())
    }
}

fn equipment_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Equipment {} not found", id))
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    borrowers: Arc<dyn BorrowerDirectory>,
    rules: RentalRules,
}

impl InventoryService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        borrowers: Arc<dyn BorrowerDirectory>,
        rules: RentalRules,
    ) -> Self {
        Self {
            store,
            borrowers,
            rules,
        }
    }

    /// Register new equipment; it always starts AVAILABLE
    pub async fn register(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;

        if let Some(requested) = data.current_status {
            if requested != EquipmentStatus::Available {
                tracing::debug!(
                    "Ignoring requested status {} for new equipment {}",
                    requested,
                    data.serial_number
                );
            }
        }

        let new = NewEquipment {
            name: data.name,
            category: data.category,
            serial_number: data.serial_number,
            purchase_date: data.purchase_date.unwrap_or_else(Utc::now),
            condition: data.condition.unwrap_or(EquipmentCondition::Excellent),
            current_status: EquipmentStatus::Available,
            notes: data.notes,
        };

        let mut tx = self.store.begin().await?;
        let equipment = tx.insert_equipment(&new).await?;
        tx.commit().await?;

        tracing::info!(
            "Registered equipment id={} serial={}",
            equipment.id,
            equipment.serial_number
        );
        Ok(equipment)
    }

    /// Check out AVAILABLE equipment to a borrower
    pub async fn checkout(
        &self,
        equipment_id: i64,
        user_id: i64,
        expected_return: DateTime<Utc>,
        notes: Option<String>,
    ) -> AppResult<Rental> {
        let borrower = self.borrowers.resolve(user_id).await?;
        let now = Utc::now();
        self.rules.validate_expected_return(now, expected_return)?;

        let mut tx = self.store.begin().await?;
        let mut equipment = tx
            .lock_equipment(equipment_id)
            .await?
            .ok_or_else(|| equipment_not_found(equipment_id))?;

        let Some(next_status) = equipment.current_status.after_checkout() else {
            tracing::warn!(
                "Checkout refused for equipment id={} in status {}",
                equipment_id,
                equipment.current_status
            );
            return Err(AppError::InvalidState(format!(
                "Equipment {} is not available for checkout (status {})",
                equipment_id, equipment.current_status
            )));
        };

        equipment.current_status = next_status;
        tx.update_equipment(&equipment).await?;
        let rental = tx
            .insert_rental(&NewRental {
                equipment_id,
                user_id: borrower.id,
                checkout_date: now,
                expected_return_date: expected_return,
                notes,
            })
            .await?;
        tx.commit().await?;

        tracing::info!(
            "Equipment id={} checked out to user id={} (rental id={}, due {})",
            equipment_id,
            borrower.id,
            rental.id,
            rental.expected_return_date
        );
        Ok(rental)
    }

    /// Close the active rental and record the observed condition
    pub async fn return_equipment(
        &self,
        equipment_id: i64,
        condition: EquipmentCondition,
    ) -> AppResult<Rental> {
        let now = Utc::now();

        let mut tx = self.store.begin().await?;
        let mut equipment = tx
            .lock_equipment(equipment_id)
            .await?
            .ok_or_else(|| equipment_not_found(equipment_id))?;

        let mut rental = tx.find_active_rental(equipment_id).await?.ok_or_else(|| {
            tracing::warn!(
                "Return refused for equipment id={} in status {}: no active rental",
                equipment_id,
                equipment.current_status
            );
            AppError::NoActiveRental(format!(
                "No active rental found for equipment {}",
                equipment_id
            ))
        })?;

        rental.status = condition.closing_rental_status();
        rental.actual_return_date = Some(now.max(rental.checkout_date));
        let rental = tx.update_rental(&rental).await?;

        equipment.condition = condition;
        equipment.current_status = condition.status_after_return();
        tx.update_equipment(&equipment).await?;
        tx.commit().await?;

        tracing::info!(
            "Equipment id={} returned in condition {} (rental id={} {}), now {}",
            equipment_id,
            condition,
            rental.id,
            rental.status,
            equipment.current_status
        );
        Ok(rental)
    }

    /// Move equipment into maintenance; refreshes the date when already there
    pub async fn schedule_maintenance(&self, equipment_id: i64) -> AppResult<Equipment> {
        let mut tx = self.store.begin().await?;
        let mut equipment = tx
            .lock_equipment(equipment_id)
            .await?
            .ok_or_else(|| equipment_not_found(equipment_id))?;

        let Some(next_status) = equipment.current_status.after_maintenance_scheduled() else {
            tracing::warn!(
                "Maintenance refused for equipment id={}: currently checked out",
                equipment_id
            );
            return Err(AppError::InvalidState(format!(
                "Equipment {} is currently checked out",
                equipment_id
            )));
        };

        equipment.current_status = next_status;
        equipment.last_maintenance_date = Some(Utc::now());
        let equipment = tx.update_equipment(&equipment).await?;
        tx.commit().await?;

        tracing::info!("Maintenance scheduled for equipment id={}", equipment_id);
        Ok(equipment)
    }

    pub async fn get_equipment(&self, id: i64) -> AppResult<Equipment> {
        self.store
            .get_equipment(id)
            .await?
            .ok_or_else(|| equipment_not_found(id))
    }

    pub async fn list_available(&self) -> AppResult<Vec<Equipment>> {
        self.store
            .list_equipment_by_status(EquipmentStatus::Available)
            .await
    }

    /// Exact, case-sensitive category match; no category lists everything
    pub async fn search(&self, category: Option<&str>) -> AppResult<Vec<Equipment>> {
        match category {
            Some(category) => self.store.list_equipment_by_category(category).await,
            None => self.store.list_equipment().await,
        }
    }

    pub async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Rental>> {
        self.store.find_overdue_rentals(now).await
    }

    /// Rentals of a borrower, newest first
    pub async fn rentals_for_user(&self, user_id: i64) -> AppResult<Vec<Rental>> {
        // Verify user exists
        self.borrowers.resolve(user_id).await?;
        self.store.list_rentals_by_user(user_id).await
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
