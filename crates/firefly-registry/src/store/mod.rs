//! Machine record storage.
//!
//! The registry talks to any backend through the [`MachineStore`] trait.
//! The trait is object-safe and used as `Arc<dyn MachineStore>`; an
//! in-memory map, an embedded database, or an external key-value store
//! are all acceptable as long as `create_if_absent` is atomic.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use firefly_common::{Fingerprint, Machine};
use thiserror::Error;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(Fingerprint),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Mutation applied to a record under the store's own synchronization.
pub type Mutator = Box<dyn FnOnce(&mut Machine) + Send>;

/// Storage backend for machine records, keyed by identity fingerprint.
#[async_trait]
pub trait MachineStore: Send + Sync {
    /// Fetch a record by identity.
    async fn get(&self, id: &Fingerprint) -> Result<Option<Machine>>;

    /// Insert `machine` under `id` unless a record already exists.
    ///
    /// Returns the stored record either way. Concurrent identical calls
    /// must observe exactly one creation: the losers get the winner's
    /// record, never a duplicate.
    async fn create_if_absent(&self, id: &Fingerprint, machine: Machine) -> Result<Machine>;

    /// Apply `mutate` to an existing record and return the result.
    /// Fails with [`StoreError::NotFound`] when no record exists.
    async fn update(&self, id: &Fingerprint, mutate: Mutator) -> Result<Machine>;

    /// All records, in unspecified order.
    async fn list(&self) -> Result<Vec<Machine>>;
}
