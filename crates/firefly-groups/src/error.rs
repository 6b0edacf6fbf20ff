//! Error types for the matching engine.
//!
//! These are all configuration-time errors: they surface when group
//! definitions are built or validated, never while matching a machine.

use thiserror::Error;

/// Error type for building and evaluating groups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// A selector failed validation at construction.
    #[error("invalid selector {name}: {reason}")]
    InvalidSelector { name: String, reason: String },

    /// A match expression failed to parse.
    #[error("malformed match expression: {0}")]
    MalformedExpression(String),

    /// A match expression references a selector the group does not declare.
    #[error("expression references unknown selector: {0}")]
    UnknownSelectorReference(String),

    /// A group definition had one or more problems; all of them are listed.
    #[error("invalid group definition {}: {}", .name, .problems.join("; "))]
    InvalidGroupDefinition { name: String, problems: Vec<String> },
}

/// Result type for matching-engine operations.
pub type Result<T> = std::result::Result<T, GroupError>;
