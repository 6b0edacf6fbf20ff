//! The machine registry: identity resolution across boots.

use std::sync::Arc;

use chrono::Utc;
use firefly_common::{Arch, Fingerprint, MacAddr, Machine};
use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::store::MachineStore;

/// Tracks machine identity and the provision flag across boots.
///
/// Every operation verifies that records round-tripped through the store
/// actually carry the requested identity; a store that returns somebody
/// else's record fails with [`RegistryError::IdentityMismatch`].
#[derive(Clone)]
pub struct MachineRegistry {
    store: Arc<dyn MachineStore>,
}

impl MachineRegistry {
    pub fn new(store: Arc<dyn MachineStore>) -> Self {
        Self { store }
    }

    /// Resolve the machine behind a boot request, creating the record on
    /// first sight with `provision = true` and a generated name.
    ///
    /// Known machines come back unchanged, except that a reported name
    /// differing from the stored one updates the record in place.
    /// Identity and the provision flag are never touched here. Two
    /// concurrent first boots for the same (mac, arch) resolve to one
    /// record via the store's `create_if_absent`.
    pub async fn identify(
        &self,
        mac: &MacAddr,
        arch: Arch,
        reported_name: Option<&str>,
    ) -> Result<Machine> {
        let id = Fingerprint::compute(mac, arch);

        if let Some(machine) = self.store.get(&id).await? {
            verify_identity(&id, &machine)?;
            if let Some(name) = reported_name {
                if name != machine.name {
                    return self.rename(&id, name).await;
                }
            }
            debug!(identity = %id, name = %machine.name, "known machine identified");
            return Ok(machine);
        }

        let mut fresh = Machine::first_boot(mac.clone(), arch);
        if let Some(name) = reported_name {
            fresh.name = name.to_string();
        }
        let machine = self.store.create_if_absent(&id, fresh).await?;
        verify_identity(&id, &machine)?;
        // a concurrent first boot may have won the create; the reported
        // name still applies to whichever record came back
        if let Some(name) = reported_name {
            if name != machine.name {
                return self.rename(&id, name).await;
            }
        }
        info!(
            identity = %id,
            mac = %machine.mac,
            arch = %machine.arch,
            name = %machine.name,
            "machine record created"
        );
        Ok(machine)
    }

    async fn rename(&self, id: &Fingerprint, name: &str) -> Result<Machine> {
        let new_name = name.to_string();
        let machine = self
            .store
            .update(
                id,
                Box::new(move |m| {
                    m.name = new_name;
                    m.updated_at = Utc::now();
                }),
            )
            .await?;
        verify_identity(id, &machine)?;
        debug!(identity = %id, name = %machine.name, "machine renamed on re-identification");
        Ok(machine)
    }

    /// Fetch a record by identity.
    pub async fn get(&self, id: &Fingerprint) -> Result<Machine> {
        match self.store.get(id).await? {
            Some(machine) => {
                verify_identity(id, &machine)?;
                Ok(machine)
            }
            None => Err(RegistryError::NotFound(id.clone())),
        }
    }

    /// Set whether the machine is provisioned on its next boot.
    pub async fn set_provision(&self, id: &Fingerprint, value: bool) -> Result<Machine> {
        let machine = self
            .store
            .update(
                id,
                Box::new(move |m| {
                    m.provision = value;
                    m.updated_at = Utc::now();
                }),
            )
            .await?;
        verify_identity(id, &machine)?;
        info!(identity = %id, provision = value, "provision flag updated");
        Ok(machine)
    }

    /// All known machine records.
    pub async fn list(&self) -> Result<Vec<Machine>> {
        Ok(self.store.list().await?)
    }
}

fn verify_identity(expected: &Fingerprint, machine: &Machine) -> Result<()> {
    let actual = machine.fingerprint();
    if actual != *expected {
        return Err(RegistryError::IdentityMismatch {
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}
