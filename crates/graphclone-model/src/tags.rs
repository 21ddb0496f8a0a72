//! Typed tag store
//!
//! Tags are small marker or data values attached to fields, properties and
//! classes. A tag is looked up by its Rust type, so each member carries at
//! most one tag of a given type.
//!
//! ```ignore
//! let tags = Tags::new().with(CloneIgnore).with(Column("user_name"));
//! assert!(tags.contains::<CloneIgnore>());
//! assert_eq!(tags.get::<Column>().map(|c| c.0), Some("user_name"));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Marks a member that the cloner must never read or copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneIgnore;

/// Marks the member whose value identifies an instance for cloning purposes
///
/// Two instances of the same class whose primary identifier values are equal
/// are treated as the same instance and produce a single copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimaryIdentifier;

/// Tag collection keyed by tag type
#[derive(Clone, Default)]
pub struct Tags {
    entries: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Tags {
    /// Create an empty tag collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, returning the collection (builder style)
    pub fn with<T: Any + Send + Sync>(mut self, tag: T) -> Self {
        self.insert(tag);
        self
    }

    /// Add or replace a tag
    pub fn insert<T: Any + Send + Sync>(&mut self, tag: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(tag));
    }

    /// Check whether a tag of type `T` is present
    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Get the tag of type `T`
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|tag| tag.downcast_ref::<T>())
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tags").field("len", &self.entries.len()).finish()
    }
}
