//! Descriptor set resolution
//!
//! Turns a class into the name-keyed set of [`MemberDescriptor`]s the engine
//! iterates, applying the ignore list and the member-discovery mode. Results
//! are memoized through a [`DescriptorCache`].

use std::sync::Arc;

use graphclone_model::Class;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{CacheKey, DescriptorCache};
use crate::descriptor::MemberDescriptor;
use crate::ignore::IgnoreSet;

/// Which declared members are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    /// Storage fields only
    Fields,
    /// Accessor pairs only
    #[default]
    Properties,
    /// Both, with the accessor pair winning when a name appears twice
    Both,
}

/// Member descriptors of one class, keyed by name, in declaration order
#[derive(Debug, Default)]
pub struct DescriptorSet {
    members: Vec<MemberDescriptor>,
    index: FxHashMap<Arc<str>, usize>,
    primary: Option<usize>,
}

impl DescriptorSet {
    /// Add a descriptor, replacing any existing one with the same name
    fn insert(&mut self, descriptor: MemberDescriptor) {
        match self.index.get(descriptor.name()) {
            Some(&position) => self.members[position] = descriptor,
            None => {
                self.index
                    .insert(descriptor.name().clone(), self.members.len());
                self.members.push(descriptor);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.index.get(name).map(|&position| &self.members[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.members.iter().map(MemberDescriptor::name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member tagged as the class's clone identity
    pub fn primary_identifier(&self) -> Option<&MemberDescriptor> {
        self.primary.map(|position| &self.members[position])
    }
}

/// Build the descriptor set for `class` without consulting any cache
pub fn build_descriptor_set(class: &Class, ignore: &IgnoreSet, kind: MemberKind) -> DescriptorSet {
    let mut set = DescriptorSet::default();
    let keep = |name: &str| !ignore.contains(class.name(), name);

    if matches!(kind, MemberKind::Fields | MemberKind::Both) {
        for field in class.fields().iter().filter(|f| keep(f.name().as_ref())) {
            set.insert(MemberDescriptor::from_field(field));
        }
    }
    // Properties go second so they replace same-named fields
    if matches!(kind, MemberKind::Properties | MemberKind::Both) {
        for property in class.properties().iter().filter(|p| keep(p.name().as_ref())) {
            set.insert(MemberDescriptor::from_property(property));
        }
    }
    set.primary = set
        .members
        .iter()
        .position(MemberDescriptor::is_primary_identifier);

    debug!(
        class = class.name(),
        kind = ?kind,
        members = set.len(),
        "built descriptor set"
    );
    set
}

/// Descriptor set for `class`, built once per (class, ignore set, kind)
pub fn resolve(
    class: &Class,
    ignore: &IgnoreSet,
    kind: MemberKind,
    cache: &dyn DescriptorCache,
) -> Arc<DescriptorSet> {
    let key = CacheKey {
        class: class.id(),
        kind,
        ignore: ignore.clone(),
    };
    cache.get_or_build(key, &|| build_descriptor_set(class, ignore, kind))
}
