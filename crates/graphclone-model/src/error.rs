//! Error types for member access and instantiation

use thiserror::Error;

/// Errors raised while reading or writing a member of an instance
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    /// The instance is not of a kind that carries storage slots or members
    #[error("Expected an object instance, got {got}")]
    NotAnInstance {
        /// Kind of the value that was supplied
        got: String,
    },

    /// Storage slot index is outside the instance
    #[error("Slot {slot} out of bounds (instance has {len} slots)")]
    SlotOutOfBounds {
        /// Requested slot
        slot: usize,
        /// Number of slots on the instance
        len: usize,
    },

    /// Element index is outside the container
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Container length
        len: usize,
    },

    /// Wrong number of initial values for an instance
    #[error("Class '{class}' expects {expected} slot values, got {got}")]
    SlotCount {
        /// Class name
        class: String,
        /// Declared slot count
        expected: usize,
        /// Supplied value count
        got: usize,
    },

    /// No member with this name is declared
    #[error("Class '{class}' has no member '{member}'")]
    UnknownMember {
        /// Class name
        class: String,
        /// Member name
        member: String,
    },

    /// Accessor pair lacks a getter
    #[error("Member '{member}' has no getter")]
    NoGetter {
        /// Member name
        member: String,
    },

    /// Accessor pair lacks a setter
    #[error("Member '{member}' has no setter")]
    NoSetter {
        /// Member name
        member: String,
    },

    /// A user-supplied accessor reported a failure
    #[error("Accessor failed: {0}")]
    Failed(String),

    /// Access to a named member failed
    #[error("Cannot access '{member}': {source}")]
    Member {
        /// Member name
        member: String,
        /// Underlying failure
        #[source]
        source: Box<AccessError>,
    },
}

impl AccessError {
    /// Attach the member name to this error
    pub fn for_member(self, member: &str) -> Self {
        match self {
            AccessError::Member { .. } => self,
            other => AccessError::Member {
                member: member.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<String> for AccessError {
    fn from(s: String) -> Self {
        AccessError::Failed(s)
    }
}

impl From<&str> for AccessError {
    fn from(s: &str) -> Self {
        AccessError::Failed(s.to_string())
    }
}

/// Errors raised while producing a new instance of a class
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InstantiateError {
    /// The class has no constructor that can be called without arguments
    #[error("Class '{class}' has no usable constructor")]
    NoConstructor {
        /// Class name
        class: String,
    },

    /// A custom constructor or construction hook failed
    #[error("Constructing '{class}' failed: {message}")]
    Failed {
        /// Class name
        class: String,
        /// Failure description
        message: String,
    },
}
