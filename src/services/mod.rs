//! Business logic services

pub mod inventory;

use std::sync::Arc;

use crate::repository::{BorrowerDirectory, InventoryStore};

pub use inventory::{InventoryService, RentalRules};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub inventory: InventoryService,
}

impl Services {
    /// Create all services on top of the given stores
    pub fn new(
        store: Arc<dyn InventoryStore>,
        borrowers: Arc<dyn BorrowerDirectory>,
        rules: RentalRules,
    ) -> Self {
        Self {
            inventory: InventoryService::new(store, borrowers, rules),
        }
    }
}
