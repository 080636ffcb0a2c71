//! Error types for the lucky-draw core

use thiserror::Error;

/// Core error type
///
/// No variant is fatal: every failure path leaves the previously valid
/// state intact and the session usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LdError {
    #[error("pool is empty, nothing left to draw")]
    EmptyPool,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("import data is not an object")]
    InvalidShape,

    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid JSON: {0}")]
    Parse(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),
}

/// Result type alias
pub type LdResult<T> = Result<T, LdError>;
