//! Per-call identity tracking

use graphclone_model::{ClassId, Key, Value};
use rustc_hash::FxHashMap;

/// What makes two source values "the same" during one clone call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CloneIdentity {
    /// Address of the source's heap cell
    Reference(usize),
    /// Class plus the value of the member tagged as primary identifier
    Primary { class: ClassId, key: Key },
}

/// Source identity to the copy already produced for it
///
/// The source is retained alongside the copy. A getter may hand out a fresh
/// temporary each time it is called, and once such a value was dropped its
/// address could be reused by an unrelated one within the same call.
#[derive(Debug, Default)]
pub(crate) struct IdentityMap {
    copies: FxHashMap<CloneIdentity, (Value, Value)>,
}

impl IdentityMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, identity: &CloneIdentity) -> Option<&Value> {
        self.copies.get(identity).map(|(_, copy)| copy)
    }

    /// Record `copy` as the copy of `source`
    pub(crate) fn insert(&mut self, identity: CloneIdentity, source: &Value, copy: Value) {
        self.copies.insert(identity, (source.clone(), copy));
    }

    pub(crate) fn len(&self) -> usize {
        self.copies.len()
    }
}
