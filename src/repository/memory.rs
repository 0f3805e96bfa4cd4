//! In-memory store
//!
//! A single async mutex serializes units of work. A transaction owns the lock
//! for its whole lifetime and stages only the rows it writes; reads inside the
//! transaction see staged rows first. Commit applies the staged rows over the
//! shared state, dropping the transaction discards them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::{BorrowerDirectory, InventoryStore, InventoryTransaction};
use crate::{
    error::{AppError, AppResult},
    models::{Borrower, Equipment, EquipmentStatus, NewEquipment, NewRental, Rental, RentalStatus},
};

#[derive(Debug, Default)]
struct MemoryState {
    equipment: BTreeMap<i64, Equipment>,
    rentals: BTreeMap<i64, Rental>,
    last_equipment_id: i64,
    last_rental_id: i64,
}

fn sorted_by_name(mut rows: Vec<Equipment>) -> Vec<Equipment> {
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    rows
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every rental ever recorded, in creation order
    pub async fn rentals(&self) -> Vec<Rental> {
        self.state.lock().await.rentals.values().cloned().collect()
    }
}

/// Rows written by one unit of work, applied over the shared state on commit
#[derive(Debug, Default)]
struct Staged {
    equipment: BTreeMap<i64, Equipment>,
    rentals: BTreeMap<i64, Rental>,
    last_equipment_id: i64,
    last_rental_id: i64,
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Staged,
}

impl MemoryTransaction {
    fn equipment(&self, id: i64) -> Option<&Equipment> {
        self.staged
            .equipment
            .get(&id)
            .or_else(|| self.guard.equipment.get(&id))
    }

    fn rental(&self, id: i64) -> Option<&Rental> {
        self.staged
            .rentals
            .get(&id)
            .or_else(|| self.guard.rentals.get(&id))
    }

    fn active_rental(&self, equipment_id: i64) -> Option<&Rental> {
        let is_match = |r: &&Rental| r.equipment_id == equipment_id && r.status.is_active();
        self.staged.rentals.values().find(is_match).or_else(|| {
            self.guard
                .rentals
                .values()
                .filter(|r| !self.staged.rentals.contains_key(&r.id))
                .find(is_match)
        })
    }
}

#[async_trait]
impl InventoryTransaction for MemoryTransaction {
    async fn insert_equipment(&mut self, data: &NewEquipment) -> AppResult<Equipment> {
        // Serial numbers never change after insert, so both maps can be scanned as is
        if self
            .staged
            .equipment
            .values()
            .chain(self.guard.equipment.values())
            .any(|e| e.serial_number == data.serial_number)
        {
            return Err(AppError::Conflict(
                "Serial number is already registered".to_string(),
            ));
        }

        let now = Utc::now();
        self.staged.last_equipment_id += 1;
        let equipment = Equipment {
            id: self.staged.last_equipment_id,
            name: data.name.clone(),
            category: data.category.clone(),
            serial_number: data.serial_number.clone(),
            purchase_date: data.purchase_date,
            condition: data.condition,
            current_status: data.current_status,
            last_maintenance_date: None,
            notes: data.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.staged.equipment.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn lock_equipment(&mut self, id: i64) -> AppResult<Option<Equipment>> {
        Ok(self.equipment(id).cloned())
    }

    async fn update_equipment(&mut self, data: &Equipment) -> AppResult<Equipment> {
        let mut stored = self
            .equipment(data.id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", data.id)))?;
        stored.current_status = data.current_status;
        stored.condition = data.condition;
        stored.last_maintenance_date = data.last_maintenance_date;
        stored.notes = data.notes.clone();
        stored.updated_at = Utc::now();
        self.staged.equipment.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn insert_rental(&mut self, rental: &NewRental) -> AppResult<Rental> {
        if self.active_rental(rental.equipment_id).is_some() {
            return Err(AppError::Conflict(
                "Equipment already has an active rental".to_string(),
            ));
        }

        self.staged.last_rental_id += 1;
        let stored = Rental {
            id: self.staged.last_rental_id,
            equipment_id: rental.equipment_id,
            user_id: rental.user_id,
            checkout_date: rental.checkout_date,
            expected_return_date: rental.expected_return_date,
            actual_return_date: None,
            status: RentalStatus::Active,
            notes: rental.notes.clone(),
            created_at: rental.checkout_date,
        };
        self.staged.rentals.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_active_rental(&mut self, equipment_id: i64) -> AppResult<Option<Rental>> {
        Ok(self.active_rental(equipment_id).cloned())
    }

    async fn update_rental(&mut self, rental: &Rental) -> AppResult<Rental> {
        let mut stored = self
            .rental(rental.id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Rental {} not found", rental.id)))?;
        stored.status = rental.status;
        stored.actual_return_date = rental.actual_return_date;
        stored.notes = rental.notes.clone();
        self.staged.rentals.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        guard.equipment.extend(staged.equipment);
        guard.rentals.extend(staged.rentals);
        guard.last_equipment_id = staged.last_equipment_id;
        guard.last_rental_id = staged.last_rental_id;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn InventoryTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = Staged {
            last_equipment_id: guard.last_equipment_id,
            last_rental_id: guard.last_rental_id,
            ..Staged::default()
        };
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }

    async fn get_equipment(&self, id: i64) -> AppResult<Option<Equipment>> {
        Ok(self.state.lock().await.equipment.get(&id).cloned())
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let state = self.state.lock().await;
        Ok(sorted_by_name(state.equipment.values().cloned().collect()))
    }

    async fn list_equipment_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>> {
        let state = self.state.lock().await;
        Ok(sorted_by_name(
            state
                .equipment
                .values()
                .filter(|e| e.current_status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn list_equipment_by_category(&self, category: &str) -> AppResult<Vec<Equipment>> {
        let state = self.state.lock().await;
        Ok(sorted_by_name(
            state
                .equipment
                .values()
                .filter(|e| e.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn list_rentals_by_user(&self, user_id: i64) -> AppResult<Vec<Rental>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Rental> = state
            .rentals
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.checkout_date.cmp(&a.checkout_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_overdue_rentals(&self, now: DateTime<Utc>) -> AppResult<Vec<Rental>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Rental> = state
            .rentals
            .values()
            .filter(|r| r.is_overdue(now))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.expected_return_date
                .cmp(&b.expected_return_date)
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Borrowers held in memory
#[derive(Clone, Default)]
pub struct MemoryBorrowerDirectory {
    borrowers: Arc<RwLock<HashMap<i64, Borrower>>>,
}

impl MemoryBorrowerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, borrower: Borrower) {
        self.borrowers.write().await.insert(borrower.id, borrower);
    }
}

#[async_trait]
impl BorrowerDirectory for MemoryBorrowerDirectory {
    async fn resolve(&self, user_id: i64) -> AppResult<Borrower> {
        self.borrowers
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }
}
