//! Cart store
//!
//! Persistence of a cart's lines between sessions. The aggregator never
//! touches a store; the caller loads records to seed a cart and saves after
//! each successful mutation (see [`crate::session::CartSession`]).

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::lines::CartLineRecord;

/// Cart store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("cart store unavailable: {0}")]
    Unavailable(String),
}

/// Loads and saves the lines of a cart.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the saved lines. An empty list means nothing was saved.
    async fn load(&self) -> Result<Vec<CartLineRecord>, StoreError>;

    /// Replace the saved lines.
    async fn save(&self, records: &[CartLineRecord]) -> Result<(), StoreError>;
}

/// In-memory cart store.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    records: Mutex<Vec<CartLineRecord>>,
}

impl InMemoryCartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding previously saved records.
    #[must_use]
    pub fn with_records(records: Vec<CartLineRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// The currently saved records.
    #[must_use]
    pub fn records(&self) -> Vec<CartLineRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self) -> Result<Vec<CartLineRecord>, StoreError> {
        Ok(self.records())
    }

    async fn save(&self, records: &[CartLineRecord]) -> Result<(), StoreError> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();

        Ok(())
    }
}
