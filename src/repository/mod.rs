//! Repository layer: storage traits and their PostgreSQL implementation
//!
//! Every multi-entity write goes through an [`InventoryTransaction`] obtained
//! from [`InventoryStore::begin`]. Writes become visible only on `commit`;
//! dropping a transaction discards them.

pub mod equipment;
pub mod memory;
pub mod rentals;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::AppResult,
    models::{Borrower, Equipment, EquipmentStatus, NewEquipment, NewRental, Rental},
};

/// One atomic unit of work spanning equipment and rentals
#[async_trait]
pub trait InventoryTransaction: Send {
    async fn insert_equipment(&mut self, data: &NewEquipment) -> AppResult<Equipment>;

    /// Read an equipment row and hold it exclusively until commit or drop
    async fn lock_equipment(&mut self, id: i64) -> AppResult<Option<Equipment>>;

    /// Persist mutable fields; refreshes `updated_at`
    async fn update_equipment(&mut self, equipment: &Equipment) -> AppResult<Equipment>;

    async fn insert_rental(&mut self, rental: &NewRental) -> AppResult<Rental>;

    async fn find_active_rental(&mut self, equipment_id: i64) -> AppResult<Option<Rental>>;

    async fn update_rental(&mut self, rental: &Rental) -> AppResult<Rental>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Equipment and rental storage
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn InventoryTransaction>>;

    async fn get_equipment(&self, id: i64) -> AppResult<Option<Equipment>>;

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn list_equipment_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>>;

    async fn list_equipment_by_category(&self, category: &str) -> AppResult<Vec<Equipment>>;

    async fn list_rentals_by_user(&self, user_id: i64) -> AppResult<Vec<Rental>>;

    /// Active rentals whose expected return is before `now`
    async fn find_overdue_rentals(&self, now: DateTime<Utc>) -> AppResult<Vec<Rental>>;

    /// Cheap round trip to the backing store
    async fn ping(&self) -> AppResult<()>;
}

/// Resolves borrower ids to identities
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowerDirectory: Send + Sync {
    /// Fails with `NotFound` when the id does not resolve
    async fn resolve(&self, user_id: i64) -> AppResult<Borrower>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRegistry,
    pub rentals: rentals::RentalLedger,
    pub users: users::UsersRepository,
    lock_timeout_ms: u64,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>, lock_timeout_ms: u64) -> Self {
        Self {
            equipment: equipment::EquipmentRegistry::new(pool.clone()),
            rentals: rentals::RentalLedger::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
            lock_timeout_ms,
        }
    }
}

/// PostgreSQL unit of work
pub struct PgInventoryTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryTransaction for PgInventoryTransaction {
    async fn insert_equipment(&mut self, data: &NewEquipment) -> AppResult<Equipment> {
        equipment::insert(&mut self.tx, data).await
    }

    async fn lock_equipment(&mut self, id: i64) -> AppResult<Option<Equipment>> {
        equipment::lock(&mut self.tx, id).await
    }

    async fn update_equipment(&mut self, data: &Equipment) -> AppResult<Equipment> {
        equipment::update(&mut self.tx, data).await
    }

    async fn insert_rental(&mut self, rental: &NewRental) -> AppResult<Rental> {
        rentals::insert(&mut self.tx, rental).await
    }

    async fn find_active_rental(&mut self, equipment_id: i64) -> AppResult<Option<Rental>> {
        rentals::find_active_by_equipment(&mut self.tx, equipment_id).await
    }

    async fn update_rental(&mut self, rental: &Rental) -> AppResult<Rental> {
        rentals::update(&mut self.tx, rental).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for Repository {
    async fn begin(&self) -> AppResult<Box<dyn InventoryTransaction>> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters; the value is a plain integer
        sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", self.lock_timeout_ms))
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgInventoryTransaction { tx }))
    }

    async fn get_equipment(&self, id: i64) -> AppResult<Option<Equipment>> {
        self.equipment.get_by_id(id).await
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.equipment.list().await
    }

    async fn list_equipment_by_status(&self, status: EquipmentStatus) -> AppResult<Vec<Equipment>> {
        self.equipment.list_by_status(status).await
    }

    async fn list_equipment_by_category(&self, category: &str) -> AppResult<Vec<Equipment>> {
        self.equipment.list_by_category(category).await
    }

    async fn list_rentals_by_user(&self, user_id: i64) -> AppResult<Vec<Rental>> {
        self.rentals.list_by_user(user_id).await
    }

    async fn find_overdue_rentals(&self, now: DateTime<Utc>) -> AppResult<Vec<Rental>> {
        self.rentals.find_overdue(now).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
