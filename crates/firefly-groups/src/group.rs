//! Machine groups: selectors, a match expression, and variables.

use std::collections::{HashMap, HashSet};

use firefly_common::Machine;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GroupError, Result};
use crate::expr::MatchExpr;
use crate::selector::Selector;

/// Raw group definition as it arrives from the external loader.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDoc {
    pub name: String,
    #[serde(default)]
    pub selectors: Vec<SelectorDoc>,
    /// Explicit match expression; selectors OR together when absent.
    #[serde(rename = "match")]
    pub match_expr: Option<String>,
    #[serde(default)]
    pub vars: HashMap<String, Value>,
}

/// Raw selector definition inside a group document.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorDoc {
    /// Label used in match expressions. Selector `i` defaults to `sel<i>`.
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub attr: String,
    pub val: String,
}

/// A validated group. Once constructed, matching is a pure function of
/// the machine: no evaluation order, no other groups, no side effects.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    selectors: Vec<Selector>,
    expr: MatchExpr,
    vars: HashMap<String, Value>,
    source_path: String,
}

impl Group {
    /// Build a group from a raw definition, validating every selector and
    /// the expression eagerly.
    ///
    /// All problems found are reported together in one
    /// [`GroupError::InvalidGroupDefinition`], not just the first, so an
    /// operator gets full diagnostic feedback in a single pass.
    pub fn from_document(source: &str, doc: &GroupDoc) -> Result<Self> {
        let mut problems = Vec::new();
        let mut selectors = Vec::new();
        let mut declared = HashSet::new();
        let mut declared_order = Vec::new();

        for (i, raw) in doc.selectors.iter().enumerate() {
            let name = raw.name.clone().unwrap_or_else(|| format!("sel{}", i + 1));
            if !declared.insert(name.clone()) {
                problems.push(format!("duplicate selector name: {name}"));
                continue;
            }
            declared_order.push(name.clone());
            match Selector::new(&name, &raw.kind, &raw.attr, &raw.val) {
                Ok(selector) => selectors.push(selector),
                Err(err) => problems.push(err.to_string()),
            }
        }

        let expr = match &doc.match_expr {
            Some(raw) => MatchExpr::parse(raw),
            None => MatchExpr::any_of(&declared_order),
        };
        let expr = match expr {
            Ok(expr) => {
                for reference in expr.references() {
                    if !declared.contains(reference) {
                        problems.push(
                            GroupError::UnknownSelectorReference(reference.to_string()).to_string(),
                        );
                    }
                }
                Some(expr)
            }
            Err(err) => {
                problems.push(err.to_string());
                None
            }
        };

        match (expr, problems.is_empty()) {
            (Some(expr), true) => Ok(Group {
                name: doc.name.clone(),
                selectors,
                expr,
                vars: doc.vars.clone(),
                source_path: source.to_string(),
            }),
            _ => Err(GroupError::InvalidGroupDefinition {
                name: doc.name.clone(),
                problems,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variables handed to every machine that matches this group.
    pub fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    /// The definition document this group came from.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Whether the machine belongs to this group.
    ///
    /// All selector results are computed up front and the expression is
    /// evaluated over them as a plain boolean formula.
    pub fn matches(&self, machine: &Machine) -> bool {
        let results: HashMap<String, bool> = self
            .selectors
            .iter()
            .map(|s| (s.name().to_string(), s.matches(machine)))
            .collect();
        // every reference was checked at construction
        self.expr.evaluate(&results).unwrap_or(false)
    }

    /// Keep only members, preserving input order.
    pub fn filter<'a>(&self, machines: &'a [Machine]) -> Vec<&'a Machine> {
        machines.iter().filter(|m| self.matches(m)).collect()
    }
}
