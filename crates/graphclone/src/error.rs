//! Cloning and configuration errors

use graphclone_model::{AccessError, InstantiateError};
use thiserror::Error;

/// Result type for clone operations
pub type CloneResult<T> = Result<T, CloneError>;

/// Fatal failure of a clone operation
///
/// Every variant aborts the whole operation; no partially populated copy is
/// returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CloneError {
    /// A new instance could not be produced
    #[error("Instantiation failed: {0}")]
    Instantiation(#[from] InstantiateError),

    /// Reading or writing a member failed
    #[error("Member access failed: {0}")]
    Access(#[from] AccessError),

    /// The target of an in-place clone is not an instance of the source's class
    #[error("Cannot clone a {from} into a {to}")]
    IncompatibleTarget { from: String, to: String },
}

/// Invalid clone configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("Invalid clone configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// An ignore entry is malformed
    #[error("Invalid ignore entry '{0}': expected `member` or `Class.member`")]
    IgnoreEntry(String),
}
