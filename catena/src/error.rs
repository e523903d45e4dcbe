//! Error types for parameter tree operations.

use std::fmt;

use crate::param::ParamType;

/// Errors raised by the parameter store and the device layer on top of it.
///
/// All of them are deterministic for a given OID and tree state; the RPC layer
/// is expected to report every variant as an invalid-argument failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Empty OID, empty path segment, or a nested path where a bare
    /// top-level name is required
    MalformedOid(String),

    /// A path segment did not resolve during a write, or a read dead-ended
    UnknownOid(String),

    /// Value kind does not match the declared parameter type
    TypeMismatch {
        oid: String,
        expected: ParamType,
        actual: ParamType,
    },

    /// Array index used under a non-array parameter, or out of range
    StructuralViolation(String),

    /// Write attempted on a read-only parameter
    ReadOnly(String),

    /// Override file or device document could not be used
    InvalidConfig(String),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::MalformedOid(oid) => write!(f, "Malformed OID '{}'", oid),
            ParamError::UnknownOid(oid) => write!(f, "No such parameter: {}", oid),
            ParamError::TypeMismatch {
                oid,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Type mismatch at '{}': expected {}, got {}",
                    oid, expected, actual
                )
            }
            ParamError::StructuralViolation(reason) => {
                write!(f, "Structural violation: {}", reason)
            }
            ParamError::ReadOnly(oid) => write!(f, "Parameter '{}' is read-only", oid),
            ParamError::InvalidConfig(reason) => write!(f, "Invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ParamError {}

impl From<serde_json::Error> for ParamError {
    fn from(e: serde_json::Error) -> Self {
        ParamError::InvalidConfig(e.to_string())
    }
}

impl From<serde_yaml::Error> for ParamError {
    fn from(e: serde_yaml::Error) -> Self {
        ParamError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ParamError>;
