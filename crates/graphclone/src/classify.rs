//! Runtime shape classification

use graphclone_model::{ArrayRef, ClassKind, ListRef, MapRef, ObjectRef, RecordRef, Value};

/// How the engine treats a value
///
/// Classification is total: anything that is not recognised as a container,
/// a record or a scalar is a general object.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Null
    Null,
    /// Array of rank greater than one
    MultiArray(&'a ArrayRef),
    /// Immutable or opaque value, reused as is
    Scalar,
    /// One-dimensional array
    Array(&'a ArrayRef),
    /// Growable, index-settable sequence
    Sequence(&'a ListRef),
    /// Key-value mapping
    Mapping(&'a MapRef),
    /// Open record, copied like a name-keyed mapping
    Record(&'a RecordRef),
    /// Instance of an anonymous record type
    Anonymous(&'a ObjectRef),
    /// Any other class instance
    Object(&'a ObjectRef),
}

impl Shape<'_> {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Scalar)
    }

    /// Arrays of any rank
    pub fn is_array(&self) -> bool {
        matches!(self, Shape::Array(_) | Shape::MultiArray(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Shape::Sequence(_))
    }

    /// Maps and open records
    pub fn is_mapping(&self) -> bool {
        matches!(self, Shape::Mapping(_) | Shape::Record(_))
    }

    pub fn is_anonymous_record(&self) -> bool {
        matches!(self, Shape::Anonymous(_))
    }
}

/// Classify a value
///
/// Multi-dimensional arrays are recognised first, then scalars, so the
/// remaining checks only ever see reference values.
pub fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::Null => Shape::Null,
        Value::Array(array) if array.rank() > 1 => Shape::MultiArray(array),
        scalar if scalar.is_scalar() => Shape::Scalar,
        Value::Array(array) => Shape::Array(array),
        Value::List(list) => Shape::Sequence(list),
        Value::Map(map) => Shape::Mapping(map),
        Value::Record(record) => Shape::Record(record),
        Value::Object(obj) if obj.class().kind() == ClassKind::Anonymous => Shape::Anonymous(obj),
        Value::Object(obj) => Shape::Object(obj),
        _ => Shape::Scalar,
    }
}
