//! Provisioning state machine for network-booting machines.
//!
//! A machine identity is either unknown (no record) or known. The
//! [`MachineRegistry`] moves an unseen identity to known on its first boot
//! by creating a record with `provision = true`, and answers every later
//! boot from the backing store. [`Provisioner::decide`] is the single
//! integration point for the serving layer: it resolves the machine,
//! collects its group variables, and reports whether it should be
//! provisioned.
//!
//! Storage is pluggable behind the [`store::MachineStore`] trait; the
//! at-most-one-creation guarantee for concurrent first boots is exactly as
//! strong as the backend's `create_if_absent` primitive.

pub mod error;
pub mod provision;
pub mod registry;
pub mod store;

pub use error::{RegistryError, Result};
pub use provision::{BootDecision, Provisioner};
pub use registry::MachineRegistry;
pub use store::{MachineStore, MemoryStore, StoreError};
