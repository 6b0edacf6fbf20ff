//! Single-attribute predicates over machines.

use firefly_common::{MacAddr, Machine};
use regex::Regex;

use crate::error::{GroupError, Result};

/// Machine attribute a selector can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAttr {
    Name,
    Mac,
    Arch,
}

impl MachineAttr {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(MachineAttr::Name),
            "mac" => Some(MachineAttr::Mac),
            "arch" => Some(MachineAttr::Arch),
            _ => None,
        }
    }

    /// Stringified view of the attribute, canonical where one exists.
    fn value_of(self, machine: &Machine) -> String {
        match self {
            MachineAttr::Name => machine.name.clone(),
            MachineAttr::Mac => machine.mac.as_str().to_string(),
            MachineAttr::Arch => machine.arch.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum SelectorKind {
    Exact(String),
    Regex(Regex),
}

/// A named predicate over one machine attribute.
///
/// Everything is validated at construction: a selector that builds
/// successfully can never fail to evaluate.
#[derive(Debug, Clone)]
pub struct Selector {
    name: String,
    attr: MachineAttr,
    kind: SelectorKind,
}

impl Selector {
    /// Build a selector from its raw definition fields.
    ///
    /// `kind` is `exact` or `regex`. Exact selectors on the mac attribute
    /// canonicalize their value here so later comparisons are always
    /// canonical-to-canonical. Regex patterns are anchored: they must
    /// cover the whole attribute value, not a substring of it.
    ///
    /// Regex selectors on `mac` run against the canonical uppercase
    /// hyphen-separated form (`AA-BB-CC-DD-EE-FF`); a lowercase or
    /// colon-separated pattern such as `aa:bb:.*` compiles but can never
    /// match.
    pub fn new(name: &str, kind: &str, attr: &str, val: &str) -> Result<Self> {
        let invalid = |reason: String| GroupError::InvalidSelector {
            name: name.to_string(),
            reason,
        };

        let attr = MachineAttr::parse(attr)
            .ok_or_else(|| invalid(format!("unknown attribute: {attr}")))?;

        let kind = match kind {
            "exact" => {
                let val = if attr == MachineAttr::Mac {
                    MacAddr::parse(val)
                        .map_err(|e| invalid(e.to_string()))?
                        .as_str()
                        .to_string()
                } else {
                    val.to_string()
                };
                SelectorKind::Exact(val)
            }
            "regex" => {
                let anchored = format!("^(?:{val})$");
                let re = Regex::new(&anchored)
                    .map_err(|e| invalid(format!("bad pattern: {e}")))?;
                SelectorKind::Regex(re)
            }
            other => return Err(invalid(format!("unknown selector type: {other}"))),
        };

        Ok(Selector {
            name: name.to_string(),
            attr,
            kind,
        })
    }

    /// Label referenced by match expressions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pure predicate: does this machine's attribute satisfy the selector.
    pub fn matches(&self, machine: &Machine) -> bool {
        let value = self.attr.value_of(machine);
        match &self.kind {
            SelectorKind::Exact(want) => match self.attr {
                // both sides are canonical, input case never matters
                MachineAttr::Mac => value.eq_ignore_ascii_case(want),
                _ => value == *want,
            },
            SelectorKind::Regex(re) => re.is_match(&value),
        }
    }
}
