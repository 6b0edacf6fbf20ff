//! The live collection of groups.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use firefly_common::Machine;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::GroupError;
use crate::group::{Group, GroupDoc};

/// Atomically swapped snapshot of all known groups.
///
/// Readers clone the current `Arc` under a momentary read lock and work
/// against an immutable vector; [`GroupSet::reload`] builds the
/// replacement entirely off-lock and swaps it in a single assignment. A
/// query therefore never observes a group mid-update and never blocks on
/// a reload in progress.
#[derive(Debug, Default)]
pub struct GroupSet {
    snapshot: RwLock<Arc<Vec<Group>>>,
}

impl GroupSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Arc<Vec<Group>> {
        // a poisoned lock still holds a valid snapshot
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the visible snapshot from a batch of definition documents.
    ///
    /// Documents that fail to parse or validate are excluded and reported
    /// per source; the remaining groups still install, so one bad file
    /// never invalidates the whole set. Merge order for
    /// [`GroupSet::resolve`] is document order.
    pub fn reload(&self, documents: &[(String, Value)]) -> Vec<(String, GroupError)> {
        let mut groups: Vec<Group> = Vec::new();
        let mut errors = Vec::new();

        for (source, raw) in documents {
            let doc: GroupDoc = match serde_json::from_value(raw.clone()) {
                Ok(doc) => doc,
                Err(err) => {
                    errors.push((
                        source.clone(),
                        GroupError::InvalidGroupDefinition {
                            name: source.clone(),
                            problems: vec![err.to_string()],
                        },
                    ));
                    continue;
                }
            };
            if groups.iter().any(|g| g.name() == doc.name) {
                errors.push((
                    source.clone(),
                    GroupError::InvalidGroupDefinition {
                        name: doc.name.clone(),
                        problems: vec!["duplicate group name".to_string()],
                    },
                ));
                continue;
            }
            match Group::from_document(source, &doc) {
                Ok(group) => groups.push(group),
                Err(err) => errors.push((source.clone(), err)),
            }
        }

        for (source, err) in &errors {
            warn!(source = %source, error = %err, "dropping group definition");
        }
        info!(installed = groups.len(), dropped = errors.len(), "reloaded group set");

        let next = Arc::new(groups);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        errors
    }

    /// Union of vars from every group matching the machine.
    ///
    /// Later groups override earlier ones on key collision, in snapshot
    /// (document) order.
    pub fn resolve(&self, machine: &Machine) -> HashMap<String, Value> {
        let snapshot = self.current();
        let mut vars = HashMap::new();
        for group in snapshot.iter() {
            if group.matches(machine) {
                debug!(group = group.name(), mac = %machine.mac, "group matched");
                for (key, value) in group.vars() {
                    vars.insert(key.clone(), value.clone());
                }
            }
        }
        vars
    }

    /// Names of the groups matching the machine, in merge order.
    pub fn matching(&self, machine: &Machine) -> Vec<String> {
        self.current()
            .iter()
            .filter(|g| g.matches(machine))
            .map(|g| g.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }
}
