//! Structured warnings for rejected mutations.
//!
//! A guarded mutation that violates an invariant leaves state unchanged and
//! hands back one of these instead of failing. The same record is logged at
//! `warn` level, so hosts that only watch the log still see it.

use crate::value::ParamType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal problem found while mutating or validating parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A parameter's name cannot change after construction.
    RenameRejected {
        /// Current (kept) name.
        name: String,
        /// Name that was refused.
        attempted: String,
    },
    /// The group already has a child with this name.
    DuplicateName {
        /// Conflicting name.
        name: String,
    },
    /// Names starting with `_` are internal.
    ReservedField {
        /// Field that was written.
        field: String,
    },
    /// `children` may only change through `add`.
    ChildrenWrite,
    /// Write to a name that is neither a child nor a group field.
    UnknownAttribute {
        /// Attribute that was written.
        name: String,
    },
    /// Value kind differs from the declared type.
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: ParamType,
        /// Type of the refused value.
        found: ParamType,
    },
    /// NaN and infinities cannot be stored; JSON has no encoding for them.
    NonFinite {
        /// Parameter name.
        name: String,
    },
    /// A value write targeted a nested group.
    NotAParameter {
        /// Group name.
        name: String,
    },
    /// Numeric value outside its declared bounds.
    OutOfRange {
        /// Parameter name.
        name: String,
        /// Current value.
        value: f64,
        /// Lower bound, if any.
        min: Option<f64>,
        /// Upper bound, if any.
        max: Option<f64>,
    },
    /// A merged value names a parameter the target group lacks.
    UnknownParameter {
        /// Name from the merge source.
        name: String,
    },
}

impl Diagnostic {
    /// Log this diagnostic at `warn` level and hand it back.
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RenameRejected { name, attempted } => {
                write!(f, "renaming '{name}' to '{attempted}' after init is prohibited")
            }
            Diagnostic::DuplicateName { name } => {
                write!(f, "name '{name}' is already in use, skipped")
            }
            Diagnostic::ReservedField { field } => write!(f, "'{field}' is private"),
            Diagnostic::ChildrenWrite => {
                f.write_str("assigning children is not supported, use add()")
            }
            Diagnostic::UnknownAttribute { name } => {
                write!(f, "group has no attribute '{name}' to assign")
            }
            Diagnostic::TypeMismatch {
                name,
                expected,
                found,
            } => write!(f, "'{name}' expects {expected}, got {found}"),
            Diagnostic::NonFinite { name } => {
                write!(f, "'{name}' only accepts finite numbers")
            }
            Diagnostic::NotAParameter { name } => {
                write!(f, "'{name}' is a group and cannot hold a value")
            }
            Diagnostic::OutOfRange {
                name,
                value,
                min,
                max,
            } => {
                write!(f, "'{name}' = {value} is outside [")?;
                match min {
                    Some(m) => write!(f, "{m}")?,
                    None => f.write_str("-inf")?,
                }
                f.write_str(", ")?;
                match max {
                    Some(m) => write!(f, "{m}")?,
                    None => f.write_str("inf")?,
                }
                f.write_str("]")
            }
            Diagnostic::UnknownParameter { name } => {
                write!(f, "no parameter '{name}' to receive saved value")
            }
        }
    }
}
