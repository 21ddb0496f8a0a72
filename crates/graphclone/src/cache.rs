//! Descriptor set cache
//!
//! Descriptor sets are computed once per (class, member kind, ignore set)
//! and then shared for the life of the cache. The engine only sees the
//! [`DescriptorCache`] trait, so embedders can swap the backing store; the
//! default is a process-wide [`SharedDescriptorCache`].

use std::sync::Arc;

use dashmap::DashMap;
use graphclone_model::ClassId;
use once_cell::sync::Lazy;

use crate::ignore::IgnoreSet;
use crate::resolver::{DescriptorSet, MemberKind};

/// Cache key for one descriptor set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Class the set describes
    pub class: ClassId,
    /// Member-discovery mode
    pub kind: MemberKind,
    /// Members excluded from the set
    pub ignore: IgnoreSet,
}

/// Lookup-or-populate store for descriptor sets
///
/// Implementations must be idempotent per key: concurrent callers asking
/// for the same key observe the same set, built at most once.
pub trait DescriptorCache: Send + Sync {
    /// Cached set for `key`, calling `build` if there is none yet
    fn get_or_build(&self, key: CacheKey, build: &dyn Fn() -> DescriptorSet)
        -> Arc<DescriptorSet>;

    /// Number of cached sets
    fn len(&self) -> usize;

    /// Check if nothing is cached
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached set
    fn clear(&self);
}

/// Thread-safe cache backed by a sharded concurrent map
pub struct SharedDescriptorCache {
    sets: DashMap<CacheKey, Arc<DescriptorSet>>,
}

impl SharedDescriptorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            sets: DashMap::new(),
        }
    }
}

impl Default for SharedDescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorCache for SharedDescriptorCache {
    fn get_or_build(
        &self,
        key: CacheKey,
        build: &dyn Fn() -> DescriptorSet,
    ) -> Arc<DescriptorSet> {
        if let Some(set) = self.sets.get(&key) {
            return Arc::clone(set.value());
        }
        // The entry holds its shard locked while building, so racing
        // callers wait for this set instead of building their own.
        let entry = self.sets.entry(key).or_insert_with(|| Arc::new(build()));
        Arc::clone(entry.value())
    }

    fn len(&self) -> usize {
        self.sets.len()
    }

    fn clear(&self) {
        self.sets.clear();
    }
}

/// Process-wide cache used by default settings
static GLOBAL_CACHE: Lazy<Arc<SharedDescriptorCache>> =
    Lazy::new(|| Arc::new(SharedDescriptorCache::new()));

/// Handle to the process-wide descriptor cache
///
/// Entries are never evicted. Every built class has its own [`ClassId`], so
/// a program that defines classes per request (including
/// [`Class::anonymous`](graphclone_model::Class::anonymous)) grows this
/// cache without bound, and each entry keeps its accessor closures alive.
/// Such callers should give their settings a scoped
/// [`SharedDescriptorCache`] or call [`DescriptorCache::clear`].
pub fn global_cache() -> Arc<dyn DescriptorCache> {
    let cache: Arc<SharedDescriptorCache> = Arc::clone(&GLOBAL_CACHE);
    cache
}
