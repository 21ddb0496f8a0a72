//! Dynamic values
//!
//! [`Value`] is the single runtime representation the cloner works on.
//! Scalar variants are immutable and self-contained; reference variants are
//! handles to shared heap cells (see [`crate::heap`]) whose identity is the
//! address of the cell.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;
use std::time::SystemTime;

use crate::class::Class;
use crate::error::AccessError;
use crate::heap::{ArrayRef, ListRef, MapRef, ObjectRef, RecordRef};

/// A dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// Unicode scalar
    Char(char),
    /// Immutable shared text
    Str(Arc<str>),
    /// Point in time
    Timestamp(SystemTime),
    /// Enumeration member
    Enum(EnumValue),
    /// Opaque resource handle, never copied
    Handle(Handle),
    /// Class instance
    Object(ObjectRef),
    /// Fixed-size, possibly multi-dimensional array
    Array(ArrayRef),
    /// Growable sequence
    List(ListRef),
    /// Key-value mapping
    Map(MapRef),
    /// Open record with no declared shape
    Record(RecordRef),
}

/// Enumeration member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Enum type name
    pub enum_name: Arc<str>,
    /// Variant name
    pub variant: Arc<str>,
}

impl EnumValue {
    /// Create an enum member
    pub fn new(enum_name: &str, variant: &str) -> Self {
        Self {
            enum_name: Arc::from(enum_name),
            variant: Arc::from(variant),
        }
    }
}

/// Opaque handle to a live resource (socket, file, thread, ...)
///
/// Handles are shared by reference; the cloner never looks inside them.
#[derive(Clone)]
pub struct Handle {
    label: Arc<str>,
    resource: Arc<dyn Any + Send + Sync>,
}

impl Handle {
    /// Wrap a resource
    pub fn new<T: Any + Send + Sync>(label: &str, resource: T) -> Self {
        Self {
            label: Arc::from(label),
            resource: Arc::new(resource),
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Borrow the wrapped resource
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.resource.downcast_ref::<T>()
    }

    /// Check whether two handles wrap the same resource
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.resource) as *const () as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@{:#x})", self.label, self.addr())
    }
}

impl Value {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    /// Create an enum member value
    pub fn enumeration(enum_name: &str, variant: &str) -> Self {
        Value::Enum(EnumValue::new(enum_name, variant))
    }

    /// Short name of the value's kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Handle(_) => "handle",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Immutable or opaque values that are reused instead of copied
    ///
    /// Instances of classes declared immutable count as scalars.
    pub fn is_scalar(&self) -> bool {
        match self {
            Value::Bool(_)
            | Value::Int(_)
            | Value::UInt(_)
            | Value::Float(_)
            | Value::Char(_)
            | Value::Str(_)
            | Value::Timestamp(_)
            | Value::Enum(_)
            | Value::Handle(_) => true,
            Value::Object(obj) => obj.class().is_immutable(),
            _ => false,
        }
    }

    /// Address of the shared heap cell for reference values
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(obj.addr()),
            Value::Array(arr) => Some(arr.addr()),
            Value::List(list) => Some(list.addr()),
            Value::Map(map) => Some(map.addr()),
            Value::Record(record) => Some(record.addr()),
            _ => None,
        }
    }

    /// Same value in the strictest sense available
    ///
    /// Reference values, strings and handles compare by pointer; other
    /// scalars compare by value.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a.ptr_eq(b),
            (a, b) => match (a.identity(), b.identity()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Class of the value, if it has one
    pub fn class(&self) -> Option<&Arc<Class>> {
        match self {
            Value::Object(obj) => Some(obj.class()),
            Value::List(list) => list.class(),
            Value::Map(map) => map.class(),
            _ => None,
        }
    }

    /// Read a storage slot of a class instance
    pub fn read_slot(&self, slot: usize) -> Result<Value, AccessError> {
        match self {
            Value::Object(obj) => obj.slot(slot),
            Value::List(list) => list.slot(slot),
            other => Err(AccessError::NotAnInstance {
                got: other.kind_name().to_string(),
            }),
        }
    }

    /// Write a storage slot of a class instance
    pub fn write_slot(&self, slot: usize, value: Value) -> Result<(), AccessError> {
        match self {
            Value::Object(obj) => obj.set_slot(slot, value),
            Value::List(list) => list.set_slot(slot, value),
            other => Err(AccessError::NotAnInstance {
                got: other.kind_name().to_string(),
            }),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<SystemTime> for Value {
    fn from(t: SystemTime) -> Self {
        Value::Timestamp(t)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<Handle> for Value {
    fn from(h: Handle) -> Self {
        Value::Handle(h)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<ArrayRef> for Value {
    fn from(arr: ArrayRef) -> Self {
        Value::Array(arr)
    }
}

impl From<ListRef> for Value {
    fn from(list: ListRef) -> Self {
        Value::List(list)
    }
}

impl From<MapRef> for Value {
    fn from(map: MapRef) -> Self {
        Value::Map(map)
    }
}

impl From<RecordRef> for Value {
    fn from(record: RecordRef) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hashable wrapper used for mapping keys and clone identities
///
/// Scalars hash and compare by value (floats by bit pattern); reference
/// values and handles hash and compare by identity.
#[derive(Debug, Clone)]
pub struct Key(Value);

impl Key {
    /// Wrap a value
    pub fn new(value: Value) -> Self {
        Key(value)
    }

    /// Borrow the wrapped value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the value
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key(value)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (a, b) => a.is_same(b),
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::UInt(u) => u.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Enum(e) => e.hash(state),
            Value::Handle(h) => h.addr().hash(state),
            other => other.identity().hash(state),
        }
    }
}
