//! Declared member types

use std::fmt;
use std::sync::Arc;

/// Declared type of a field or property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Unsigned integer
    UInt,
    /// Floating point number
    Float,
    /// Unicode scalar
    Char,
    /// Immutable text
    Str,
    /// Point in time
    Timestamp,
    /// Enumeration, by enum name
    Enum(Arc<str>),
    /// Opaque resource handle (socket, file, thread, ...)
    Handle,
    /// Instance of a named class
    Class(Arc<str>),
    /// Array of the given element type and rank
    Array {
        /// Element type
        element: Box<TypeRef>,
        /// Number of dimensions
        rank: usize,
    },
    /// Growable sequence
    List(Box<TypeRef>),
    /// Key-value mapping
    Map {
        /// Key type
        key: Box<TypeRef>,
        /// Value type
        value: Box<TypeRef>,
    },
    /// Open record with no fixed shape
    Record,
    /// Statically unknown
    Any,
}

impl TypeRef {
    /// Class type by name
    pub fn class(name: &str) -> Self {
        TypeRef::Class(Arc::from(name))
    }

    /// Enum type by name
    pub fn enumeration(name: &str) -> Self {
        TypeRef::Enum(Arc::from(name))
    }

    /// Array type
    pub fn array(element: TypeRef, rank: usize) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank,
        }
    }

    /// List type
    pub fn list(element: TypeRef) -> Self {
        TypeRef::List(Box::new(element))
    }

    /// Map type
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Immutable, self-contained values that are shared rather than copied
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeRef::Bool
                | TypeRef::Int
                | TypeRef::UInt
                | TypeRef::Float
                | TypeRef::Char
                | TypeRef::Str
                | TypeRef::Timestamp
                | TypeRef::Enum(_)
                | TypeRef::Handle
        )
    }

    /// Opaque handle types
    pub fn is_handle(&self) -> bool {
        matches!(self, TypeRef::Handle)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::Int => write!(f, "int"),
            TypeRef::UInt => write!(f, "uint"),
            TypeRef::Float => write!(f, "float"),
            TypeRef::Char => write!(f, "char"),
            TypeRef::Str => write!(f, "string"),
            TypeRef::Timestamp => write!(f, "timestamp"),
            TypeRef::Enum(name) | TypeRef::Class(name) => write!(f, "{}", name),
            TypeRef::Handle => write!(f, "handle"),
            TypeRef::Array { element, rank } => {
                write!(f, "{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
            TypeRef::List(element) => write!(f, "List<{}>", element),
            TypeRef::Map { key, value } => write!(f, "Map<{}, {}>", key, value),
            TypeRef::Record => write!(f, "record"),
            TypeRef::Any => write!(f, "any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        assert!(TypeRef::Int.is_scalar());
        assert!(TypeRef::Str.is_scalar());
        assert!(TypeRef::enumeration("Color").is_scalar());
        assert!(TypeRef::Handle.is_scalar());
        assert!(!TypeRef::class("Person").is_scalar());
        assert!(!TypeRef::list(TypeRef::Int).is_scalar());
        assert!(!TypeRef::Any.is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeRef::array(TypeRef::Int, 1).to_string(), "int[]");
        assert_eq!(TypeRef::array(TypeRef::Float, 3).to_string(), "float[,,]");
        assert_eq!(
            TypeRef::map(TypeRef::Str, TypeRef::class("Node")).to_string(),
            "Map<string, Node>"
        );
    }
}
