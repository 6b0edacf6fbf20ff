//! Machine-group matching engine.
//!
//! Groups bundle attribute selectors, an optional boolean match expression
//! over the selector results, and a bag of variables handed to every
//! machine that matches. The [`GroupSet`] holds the currently visible
//! groups as an atomically swapped snapshot, so boot-time queries never
//! observe a reload in progress.
//!
//! # Example
//!
//! ```
//! use firefly_common::{Arch, MacAddr, Machine};
//! use firefly_groups::GroupSet;
//! use serde_json::json;
//!
//! let set = GroupSet::new();
//! let errors = set.reload(&[(
//!     "groups/lab.json".to_string(),
//!     json!({
//!         "name": "lab",
//!         "selectors": [
//!             {"name": "rack", "type": "regex", "attr": "mac", "val": "11-22-.*"}
//!         ],
//!         "vars": {"subnet": "10.1.0.0/24"}
//!     }),
//! )]);
//! assert!(errors.is_empty());
//!
//! let machine = Machine::first_boot(
//!     MacAddr::parse("11:22:33:44:55:66").unwrap(),
//!     Arch::X86_64,
//! );
//! let vars = set.resolve(&machine);
//! assert_eq!(vars["subnet"], "10.1.0.0/24");
//! ```

pub mod error;
pub mod expr;
pub mod group;
pub mod selector;
pub mod set;

pub use error::{GroupError, Result};
pub use expr::MatchExpr;
pub use group::{Group, GroupDoc, SelectorDoc};
pub use selector::{MachineAttr, Selector};
pub use set::GroupSet;
