//! In-memory storage backend.
//!
//! Reference implementation of the store contract. Useful on its own for
//! single-node deployments and as the backend for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use firefly_common::{Fingerprint, Machine};

use super::{MachineStore, Mutator, Result, StoreError};

/// In-memory machine record store.
pub struct MemoryStore {
    records: RwLock<HashMap<Fingerprint, Machine>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MachineStore for MemoryStore {
    async fn get(&self, id: &Fingerprint) -> Result<Option<Machine>> {
        let guard = self
            .records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(guard.get(id).cloned())
    }

    async fn create_if_absent(&self, id: &Fingerprint, machine: Machine) -> Result<Machine> {
        let mut guard = self
            .records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        // one write lock covers the check and the insert
        Ok(guard.entry(id.clone()).or_insert(machine).clone())
    }

    async fn update(&self, id: &Fingerprint, mutate: Mutator) -> Result<Machine> {
        let mut guard = self
            .records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        match guard.get_mut(id) {
            Some(record) => {
                mutate(record);
                Ok(record.clone())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn list(&self) -> Result<Vec<Machine>> {
        let guard = self
            .records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(guard.values().cloned().collect())
    }
}
