//! The boot-time decision.
//!
//! One inbound boot identification resolves to: which machine is this,
//! which group variables apply to it, and should it be provisioned. The
//! serving layer renders templates from the answer; everything here stays
//! protocol-agnostic.

use std::collections::HashMap;
use std::sync::Arc;

use firefly_common::{Arch, MacAddr, Machine};
use firefly_groups::GroupSet;
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::registry::MachineRegistry;

/// Outcome of one boot identification.
#[derive(Debug, Clone)]
pub struct BootDecision {
    pub machine: Machine,
    /// Merged vars from every matching group, later groups winning.
    pub vars: HashMap<String, Value>,
    pub should_provision: bool,
}

/// Single integration point consumed by the serving layer.
pub struct Provisioner {
    registry: MachineRegistry,
    groups: Arc<GroupSet>,
}

impl Provisioner {
    pub fn new(registry: MachineRegistry, groups: Arc<GroupSet>) -> Self {
        Self { registry, groups }
    }

    pub fn registry(&self) -> &MachineRegistry {
        &self.registry
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Identify the booting machine and assemble its provisioning decision.
    pub async fn decide(&self, mac: &MacAddr, arch: Arch) -> Result<BootDecision> {
        let machine = self.registry.identify(mac, arch, None).await?;
        let vars = self.groups.resolve(&machine);
        let should_provision = machine.provision;
        info!(
            mac = %machine.mac,
            arch = %machine.arch,
            should_provision,
            vars = vars.len(),
            "boot decision"
        );
        Ok(BootDecision {
            machine,
            vars,
            should_provision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn provisioner_with_groups(documents: Vec<(&str, Value)>) -> Provisioner {
        let groups = Arc::new(GroupSet::new());
        let documents: Vec<(String, Value)> = documents
            .into_iter()
            .map(|(s, v)| (s.to_string(), v))
            .collect();
        let errors = groups.reload(&documents);
        assert!(errors.is_empty(), "{errors:?}");

        Provisioner::new(
            MachineRegistry::new(Arc::new(MemoryStore::new())),
            groups,
        )
    }

    fn mac(s: &str) -> MacAddr {
        MacAddr::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_decide_creates_machine_and_collects_vars() {
        let provisioner = provisioner_with_groups(vec![
            (
                "lab.json",
                json!({
                    "name": "lab",
                    "selectors": [
                        {"name": "rack", "type": "regex", "attr": "mac", "val": "11-22-.*"}
                    ],
                    "vars": {"os": "debian", "mirror": "http://mirror.internal"}
                }),
            ),
            (
                "arm.json",
                json!({
                    "name": "arm",
                    "selectors": [
                        {"name": "a", "type": "exact", "attr": "arch", "val": "aarch64"}
                    ],
                    "vars": {"os": "fedora"}
                }),
            ),
        ]);

        let decision = provisioner
            .decide(&mac("11:22:33:44:55:66"), Arch::X86_64)
            .await
            .unwrap();

        assert!(decision.should_provision, "first boot provisions");
        assert_eq!(decision.vars["os"], "debian");
        assert_eq!(decision.vars["mirror"], "http://mirror.internal");

        // the aarch64 variant of the same mac matches the arm group too
        let decision = provisioner
            .decide(&mac("11:22:33:44:55:66"), Arch::Aarch64)
            .await
            .unwrap();
        assert_eq!(decision.vars["os"], "fedora");
    }

    #[tokio::test]
    async fn test_decide_respects_stored_provision_flag() {
        let provisioner = provisioner_with_groups(vec![]);
        let m = mac("11-22-33-44-55-66");

        let first = provisioner.decide(&m, Arch::X86_64).await.unwrap();
        assert!(first.should_provision);

        let id = first.machine.fingerprint();
        provisioner.registry().set_provision(&id, false).await.unwrap();

        let second = provisioner.decide(&m, Arch::X86_64).await.unwrap();
        assert!(!second.should_provision);
        assert_eq!(second.machine.fingerprint(), id);
    }

    #[tokio::test]
    async fn test_decide_with_no_matching_groups_has_empty_vars() {
        let provisioner = provisioner_with_groups(vec![(
            "other.json",
            json!({
                "name": "other",
                "selectors": [
                    {"name": "m", "type": "exact", "attr": "mac", "val": "99-99-99-99-99-99"}
                ],
                "vars": {"unused": true}
            }),
        )]);

        let decision = provisioner
            .decide(&mac("11-22-33-44-55-66"), Arch::X86_64)
            .await
            .unwrap();
        assert!(decision.vars.is_empty());
    }

    #[tokio::test]
    async fn test_decide_sees_groups_installed_after_construction() {
        let provisioner = provisioner_with_groups(vec![]);
        let m = mac("11-22-33-44-55-66");

        let before = provisioner.decide(&m, Arch::X86_64).await.unwrap();
        assert!(before.vars.is_empty());

        provisioner.groups().reload(&[(
            "late.json".to_string(),
            json!({
                "name": "late",
                "selectors": [
                    {"name": "m", "type": "regex", "attr": "mac", "val": "11-.*"}
                ],
                "vars": {"added": "later"}
            }),
        )]);

        let after = provisioner.decide(&m, Arch::X86_64).await.unwrap();
        assert_eq!(after.vars["added"], "later");
    }
}
