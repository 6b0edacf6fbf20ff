//! Shared machine model for the firefly provisioning core.
//!
//! This crate holds the one canonical [`Machine`] type plus its identity
//! model: canonical MAC addresses, the architecture enum, and the
//! deterministic [`Fingerprint`] that names a machine record across boots.

pub mod error;
pub mod machine;
pub mod name;

pub use error::ModelError;
pub use machine::{Arch, Fingerprint, MacAddr, Machine};
pub use name::default_name;
