//! Heap-allocated reference values
//!
//! Each handle type wraps an `Arc` around a cell whose mutable parts sit
//! behind a `parking_lot::RwLock`. Accessors copy data out of the lock before
//! returning, so no guard outlives a method call and a graph can be walked
//! recursively (including through cycles) without re-entrant locking.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class::Class;
use crate::error::AccessError;
use crate::types::TypeRef;
use crate::value::{Key, Value};

fn default_slots(class: &Class) -> Vec<Value> {
    class
        .fields()
        .iter()
        .map(|field| field.default_value().clone())
        .collect()
}

fn read_slot(slots: &RwLock<Vec<Value>>, slot: usize) -> Result<Value, AccessError> {
    let slots = slots.read();
    slots.get(slot).cloned().ok_or(AccessError::SlotOutOfBounds {
        slot,
        len: slots.len(),
    })
}

fn write_slot(slots: &RwLock<Vec<Value>>, slot: usize, value: Value) -> Result<(), AccessError> {
    let mut slots = slots.write();
    let len = slots.len();
    match slots.get_mut(slot) {
        Some(entry) => {
            *entry = value;
            Ok(())
        }
        None => Err(AccessError::SlotOutOfBounds { slot, len }),
    }
}

// ============================================================================
// Objects
// ============================================================================

struct ObjectCell {
    class: Arc<Class>,
    slots: RwLock<Vec<Value>>,
}

/// Shared handle to a class instance
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// Allocate an instance with every slot at its declared default
    pub fn new(class: &Arc<Class>) -> Self {
        Self(Arc::new(ObjectCell {
            class: Arc::clone(class),
            slots: RwLock::new(default_slots(class)),
        }))
    }

    /// Allocate an instance with explicit slot values, in field order
    pub fn with_slots(class: &Arc<Class>, slots: Vec<Value>) -> Result<Self, AccessError> {
        if slots.len() != class.slot_count() {
            return Err(AccessError::SlotCount {
                class: class.name().to_string(),
                expected: class.slot_count(),
                got: slots.len(),
            });
        }
        Ok(Self(Arc::new(ObjectCell {
            class: Arc::clone(class),
            slots: RwLock::new(slots),
        })))
    }

    /// Class of this instance
    pub fn class(&self) -> &Arc<Class> {
        &self.0.class
    }

    /// Read a slot
    pub fn slot(&self, slot: usize) -> Result<Value, AccessError> {
        read_slot(&self.0.slots, slot)
    }

    /// Write a slot
    pub fn set_slot(&self, slot: usize, value: Value) -> Result<(), AccessError> {
        write_slot(&self.0.slots, slot, value)
    }

    /// Snapshot of all slots
    pub fn slots(&self) -> Vec<Value> {
        self.0.slots.read().clone()
    }

    /// Overwrite every slot at once, in field order
    pub fn replace_slots(&self, slots: Vec<Value>) -> Result<(), AccessError> {
        let mut current = self.0.slots.write();
        if slots.len() != current.len() {
            return Err(AccessError::SlotCount {
                class: self.0.class.name().to_string(),
                expected: current.len(),
                got: slots.len(),
            });
        }
        *current = slots;
        Ok(())
    }

    /// Read a field by name
    pub fn field(&self, name: &str) -> Result<Value, AccessError> {
        let slot = self.0.class.field_slot(name)?;
        self.slot(slot)
    }

    /// Write a field by name
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let slot = self.0.class.field_slot(name)?;
        self.set_slot(slot, value.into())
    }

    /// Read a property through its getter
    pub fn property(&self, name: &str) -> Result<Value, AccessError> {
        let property = self.0.class.require_property(name)?;
        property.get(&Value::Object(self.clone()))
    }

    /// Write a property through its setter
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let property = self.0.class.require_property(name)?;
        property.set(&Value::Object(self.clone()), value.into())
    }

    /// Check whether two handles point at the same instance
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the instance
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.0.class.name(), self.addr())
    }
}

// ============================================================================
// Lists
// ============================================================================

struct ListCell {
    class: Option<Arc<Class>>,
    items: RwLock<Vec<Value>>,
    slots: RwLock<Vec<Value>>,
}

/// Shared handle to a growable sequence
///
/// A list may belong to a sequence class, in which case it also carries the
/// storage slots that class declares.
#[derive(Clone)]
pub struct ListRef(Arc<ListCell>);

impl ListRef {
    /// Create an empty plain list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty plain list with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Arc::new(ListCell {
            class: None,
            items: RwLock::new(Vec::with_capacity(capacity)),
            slots: RwLock::new(Vec::new()),
        }))
    }

    /// Create an empty list of a sequence class
    pub fn of_class(class: &Arc<Class>, capacity: usize) -> Self {
        Self(Arc::new(ListCell {
            class: Some(Arc::clone(class)),
            items: RwLock::new(Vec::with_capacity(capacity)),
            slots: RwLock::new(default_slots(class)),
        }))
    }

    /// Create a plain list from values
    pub fn from_values(values: Vec<Value>) -> Self {
        Self(Arc::new(ListCell {
            class: None,
            items: RwLock::new(values),
            slots: RwLock::new(Vec::new()),
        }))
    }

    /// Sequence class, if any
    pub fn class(&self) -> Option<&Arc<Class>> {
        self.0.class.as_ref()
    }

    pub fn len(&self) -> usize {
        self.0.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.0.items.read().capacity()
    }

    /// Append an element
    pub fn push(&self, value: impl Into<Value>) {
        self.0.items.write().push(value.into());
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.read().get(index).cloned()
    }

    /// Replace the element at `index`
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<(), AccessError> {
        let mut items = self.0.items.write();
        let len = items.len();
        match items.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                Ok(())
            }
            None => Err(AccessError::IndexOutOfBounds { index, len }),
        }
    }

    /// Snapshot of the elements
    pub fn items(&self) -> Vec<Value> {
        self.0.items.read().clone()
    }

    /// Read a storage slot declared by the list's class
    pub fn slot(&self, slot: usize) -> Result<Value, AccessError> {
        read_slot(&self.0.slots, slot)
    }

    /// Write a storage slot declared by the list's class
    pub fn set_slot(&self, slot: usize, value: Value) -> Result<(), AccessError> {
        write_slot(&self.0.slots, slot, value)
    }

    /// Snapshot of the storage slots
    pub fn slots(&self) -> Vec<Value> {
        self.0.slots.read().clone()
    }

    /// Read a declared field by name
    pub fn field(&self, name: &str) -> Result<Value, AccessError> {
        let slot = self.require_class(name)?.field_slot(name)?;
        self.slot(slot)
    }

    /// Write a declared field by name
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let slot = self.require_class(name)?.field_slot(name)?;
        self.set_slot(slot, value.into())
    }

    fn require_class(&self, member: &str) -> Result<&Arc<Class>, AccessError> {
        self.class().ok_or_else(|| AccessError::UnknownMember {
            class: "List".to_string(),
            member: member.to_string(),
        })
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Default for ListRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.class().map(|c| c.name()).unwrap_or("List");
        write!(f, "{}[{}]@{:#x}", name, self.len(), self.addr())
    }
}

// ============================================================================
// Maps
// ============================================================================

struct MapCell {
    class: Option<Arc<Class>>,
    entries: RwLock<FxHashMap<Key, Value>>,
}

/// Shared handle to a key-value mapping with distinct keys
#[derive(Clone)]
pub struct MapRef(Arc<MapCell>);

impl MapRef {
    /// Create an empty plain mapping
    pub fn new() -> Self {
        Self(Arc::new(MapCell {
            class: None,
            entries: RwLock::new(FxHashMap::default()),
        }))
    }

    /// Create an empty mapping of a mapping class
    pub fn of_class(class: &Arc<Class>) -> Self {
        Self(Arc::new(MapCell {
            class: Some(Arc::clone(class)),
            entries: RwLock::new(FxHashMap::default()),
        }))
    }

    /// Mapping class, if any
    pub fn class(&self) -> Option<&Arc<Class>> {
        self.0.class.as_ref()
    }

    pub fn len(&self) -> usize {
        self.0.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.entries.read().is_empty()
    }

    /// Insert under a key, returning the previous value
    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.insert_key(Key::new(key.into()), value.into())
    }

    /// Insert under an existing key handle, keeping the key reference as is
    pub fn insert_key(&self, key: Key, value: Value) -> Option<Value> {
        self.0.entries.write().insert(key, value)
    }

    /// Value stored under `key`
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0.entries.read().get(&Key::new(key.clone())).cloned()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.entries.read().contains_key(&Key::new(key.clone()))
    }

    /// Key that is stored for `key`, as inserted
    pub fn stored_key(&self, key: &Value) -> Option<Key> {
        self.0
            .entries
            .read()
            .get_key_value(&Key::new(key.clone()))
            .map(|(k, _)| k.clone())
    }

    /// Snapshot of all entries
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Snapshot of all keys
    pub fn keys(&self) -> Vec<Key> {
        self.0.entries.read().keys().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Default for MapRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.class().map(|c| c.name()).unwrap_or("Map");
        write!(f, "{}{{{}}}@{:#x}", name, self.len(), self.addr())
    }
}

// ============================================================================
// Arrays
// ============================================================================

struct ArrayCell {
    element: TypeRef,
    dims: Vec<usize>,
    items: RwLock<Vec<Value>>,
}

/// Shared handle to a fixed-size array
///
/// Multi-dimensional arrays store their elements in row-major order.
#[derive(Clone)]
pub struct ArrayRef(Arc<ArrayCell>);

impl ArrayRef {
    /// One-dimensional array of `len` nulls
    pub fn new(element: TypeRef, len: usize) -> Self {
        Self::multi(element, &[len])
    }

    /// Array with the given dimensions, filled with nulls
    pub fn multi(element: TypeRef, dims: &[usize]) -> Self {
        let len = dims.iter().product();
        Self(Arc::new(ArrayCell {
            element,
            dims: dims.to_vec(),
            items: RwLock::new(vec![Value::Null; len]),
        }))
    }

    /// One-dimensional array holding `values`
    pub fn from_values(element: TypeRef, values: Vec<Value>) -> Self {
        Self(Arc::new(ArrayCell {
            element,
            dims: vec![values.len()],
            items: RwLock::new(values),
        }))
    }

    /// Declared element type
    pub fn element_type(&self) -> &TypeRef {
        &self.0.element
    }

    /// Length of every dimension
    pub fn dims(&self) -> &[usize] {
        &self.0.dims
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.0.dims.len()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.0.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a flat index
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.read().get(index).cloned()
    }

    /// Replace the element at a flat index
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<(), AccessError> {
        let mut items = self.0.items.write();
        let len = items.len();
        match items.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                Ok(())
            }
            None => Err(AccessError::IndexOutOfBounds { index, len }),
        }
    }

    /// Element at multi-dimensional coordinates
    pub fn get_at(&self, indices: &[usize]) -> Result<Value, AccessError> {
        let index = self.flat_index(indices)?;
        self.get(index).ok_or(AccessError::IndexOutOfBounds {
            index,
            len: self.len(),
        })
    }

    /// Replace the element at multi-dimensional coordinates
    pub fn set_at(&self, indices: &[usize], value: impl Into<Value>) -> Result<(), AccessError> {
        let index = self.flat_index(indices)?;
        self.set(index, value)
    }

    /// Snapshot of the elements in row-major order
    pub fn items(&self) -> Vec<Value> {
        self.0.items.read().clone()
    }

    /// New array of the same shape sharing every element by reference
    pub fn shallow_copy(&self) -> ArrayRef {
        Self(Arc::new(ArrayCell {
            element: self.0.element.clone(),
            dims: self.0.dims.clone(),
            items: RwLock::new(self.items()),
        }))
    }

    fn flat_index(&self, indices: &[usize]) -> Result<usize, AccessError> {
        if indices.len() != self.0.dims.len() {
            return Err(AccessError::Failed(format!(
                "Expected {} indices, got {}",
                self.0.dims.len(),
                indices.len()
            )));
        }
        let mut flat = 0;
        for (&index, &dim) in indices.iter().zip(&self.0.dims) {
            if index >= dim {
                return Err(AccessError::IndexOutOfBounds { index, len: dim });
            }
            flat = flat * dim + index;
        }
        Ok(flat)
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}@{:#x}", self.0.element, self.0.dims, self.addr())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Shared handle to an open, ordered name/value record
#[derive(Clone)]
pub struct RecordRef(Arc<RwLock<Vec<(Arc<str>, Value)>>>);

impl RecordRef {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(Vec::new())))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Value of the named entry
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0
            .read()
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.read().iter().any(|(n, _)| &**n == name)
    }

    /// Set the named entry, appending it if it does not exist yet
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut entries = self.0.write();
        match entries.iter_mut().find(|(n, _)| &**n == name) {
            Some((_, slot)) => *slot = value,
            None => entries.push((Arc::from(name), value)),
        }
    }

    /// Append an entry unless the name is already present
    ///
    /// Returns `false` and leaves the record untouched when it is.
    pub fn try_insert(&self, name: Arc<str>, value: Value) -> bool {
        let mut entries = self.0.write();
        if entries.iter().any(|(n, _)| *n == name) {
            return false;
        }
        entries.push((name, value));
        true
    }

    /// Snapshot of the entries in insertion order
    pub fn entries(&self) -> Vec<(Arc<str>, Value)> {
        self.0.read().clone()
    }

    /// Entry names in insertion order
    pub fn names(&self) -> Vec<Arc<str>> {
        self.0.read().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn ptr_eq(&self, other: &RecordRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Default for RecordRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record{:?}@{:#x}", self.names(), self.addr())
    }
}
