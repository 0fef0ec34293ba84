//! Error types for parameter lookup and decoding.

use crate::value::ParamType;
use thiserror::Error;

/// Errors that propagate to the caller.
///
/// Rejected mutations (renames, duplicate adds, reserved writes) are not
/// errors; they surface as [`Diagnostic`](crate::Diagnostic)s instead.
#[derive(Error, Debug)]
pub enum ParamError {
    /// No child with this name exists.
    #[error("'ParameterGroup' has no parameter '{0}'")]
    NoSuchParameter(String),

    /// The child exists but is a nested group.
    #[error("'{0}' is a group, not a parameter")]
    NotAParameter(String),

    /// The child exists but is a parameter.
    #[error("'{0}' is a parameter, not a group")]
    NotAGroup(String),

    /// A value does not match the declared type.
    #[error("parameter '{name}' is declared {expected} but holds {found}")]
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: ParamType,
        /// Type of the offending value.
        found: ParamType,
    },

    /// A number is NaN or infinite.
    #[error("parameter '{0}' must be a finite number")]
    NonFinite(String),

    /// JSON is well-formed but not a parameter or group.
    #[error("invalid parameter data: {0}")]
    InvalidShape(String),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A model failed to build from its parameters.
    #[error("build failed: {0}")]
    Build(String),
}

/// Result type for parameter operations.
pub type Result<T> = std::result::Result<T, ParamError>;
