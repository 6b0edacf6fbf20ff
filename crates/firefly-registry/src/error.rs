//! Runtime errors surfaced to callers of the registry.
//!
//! The registry performs no silent retries: store failures propagate
//! directly and retry policy stays with the caller.

use firefly_common::Fingerprint;
use thiserror::Error;

use crate::store::StoreError;

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record exists for the identity.
    #[error("no machine record for identity {0}")]
    NotFound(Fingerprint),

    /// The store round-tripped a record whose identity does not match
    /// the requested one. A protocol violation, never silently accepted.
    #[error("store returned record {actual} for identity {expected}")]
    IdentityMismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// The backing store could not be reached or misbehaved.
    #[error("machine store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RegistryError::NotFound(id),
            StoreError::Unavailable(msg) => RegistryError::StoreUnavailable(msg),
            StoreError::InvalidData(msg) => RegistryError::StoreUnavailable(msg),
        }
    }
}
