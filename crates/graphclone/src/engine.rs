//! Deep clone engine
//!
//! Walks a value graph and produces an independent copy of it. Every source
//! reference reachable from the root is copied at most once per call: a copy
//! is recorded in the call's identity map *before* its contents are filled
//! in, so cycles close onto the copy under construction and shared
//! references stay shared.

use std::sync::Arc;

use graphclone_model::{
    ArrayRef, Class, ClassId, ClassKind, Key, ListRef, MapRef, ObjectRef, RecordRef, Value,
    SEQUENCE_CONTRACT,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::classify::{classify, Shape};
use crate::error::{CloneError, CloneResult};
use crate::identity::{CloneIdentity, IdentityMap};
use crate::resolver::{resolve, DescriptorSet, MemberKind};
use crate::settings::{CloneLevel, CloneSettings};

/// Deep-clone `value` with default settings
///
/// Properties are discovered, the whole graph is copied, nothing is ignored
/// and descriptor sets come from the process-wide cache.
pub fn deep_clone(value: &Value) -> CloneResult<Value> {
    deep_clone_with(value, &CloneSettings::default())
}

/// Deep-clone `value` with explicit settings
pub fn deep_clone_with(value: &Value, settings: &CloneSettings) -> CloneResult<Value> {
    let mut context = CloneContext::new(settings);
    let copy = context.clone_value(value)?;
    trace!(copies = context.identities.len(), "clone finished");
    Ok(copy)
}

/// Reusable cloner bound to one set of settings
#[derive(Debug, Clone, Default)]
pub struct DeepCloner {
    settings: CloneSettings,
}

impl DeepCloner {
    pub fn new(settings: CloneSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CloneSettings {
        &self.settings
    }

    /// Deep-clone `value`
    pub fn clone_value(&self, value: &Value) -> CloneResult<Value> {
        deep_clone_with(value, &self.settings)
    }

    /// Populate an existing instance from `source`
    ///
    /// Both values must be general objects of the same class. Members are
    /// copied exactly as [`clone_value`](Self::clone_value) would copy them
    /// into a fresh instance, and references back to `source` resolve to
    /// `target`. If any member fails, `target` is restored to the slot
    /// values it had before the call.
    pub fn clone_into(&self, source: &Value, target: &Value) -> CloneResult<()> {
        let incompatible = || CloneError::IncompatibleTarget {
            from: describe(source),
            to: describe(target),
        };
        let (Value::Object(from), Value::Object(to)) = (source, target) else {
            return Err(incompatible());
        };
        let class = from.class();
        if class.kind() != ClassKind::Object || class.id() != to.class().id() {
            return Err(incompatible());
        }

        let mut context = CloneContext::new(&self.settings);
        if let Some(identity) = context.identity_of(source, Shape::Object(from))? {
            context.identities.insert(identity, source, target.clone());
        }

        let snapshot = to.slots();
        context
            .populate(source, target, class, self.settings.level, &[])
            .or_else(|err| {
                debug!(class = class.name(), error = %err, "clone_into failed, restoring target");
                to.replace_slots(snapshot)?;
                Err(err)
            })
    }

    /// Descriptor set the cloner uses for `class`
    pub fn descriptors(&self, class: &Class) -> Arc<DescriptorSet> {
        resolve(
            class,
            &self.settings.ignore,
            self.settings.member_kind,
            self.settings.cache(),
        )
    }

    /// Fresh instance of `class` through the configured construction path
    pub fn create_instance(&self, class: &Arc<Class>) -> CloneResult<Value> {
        Ok(self.settings.create_instance(class)?)
    }
}

fn describe(value: &Value) -> String {
    match value.class() {
        Some(class) => class.name().to_string(),
        None => value.kind_name().to_string(),
    }
}

/// State of one top-level clone call
struct CloneContext<'s> {
    settings: &'s CloneSettings,
    identities: IdentityMap,
    resolved: FxHashMap<(ClassId, MemberKind), Arc<DescriptorSet>>,
}

impl<'s> CloneContext<'s> {
    fn new(settings: &'s CloneSettings) -> Self {
        Self {
            settings,
            identities: IdentityMap::new(),
            resolved: FxHashMap::default(),
        }
    }

    fn clone_value(&mut self, value: &Value) -> CloneResult<Value> {
        match classify(value) {
            Shape::Null => Ok(Value::Null),
            // Rank > 1 arrays are copied one level deep and never tracked
            Shape::MultiArray(array) => Ok(Value::Array(array.shallow_copy())),
            Shape::Scalar => Ok(value.clone()),
            shape => self.clone_reference(value, shape),
        }
    }

    fn clone_reference(&mut self, value: &Value, shape: Shape<'_>) -> CloneResult<Value> {
        let Some(identity) = self.identity_of(value, shape)? else {
            return Ok(value.clone());
        };
        if let Some(copy) = self.identities.get(&identity) {
            trace!(identity = ?identity, "identity map hit");
            return Ok(copy.clone());
        }

        match shape {
            Shape::Array(array) => self.clone_array(value, array, identity),
            Shape::Sequence(list) => self.clone_list(value, list, identity),
            Shape::Mapping(map) => self.clone_map(value, map, identity),
            Shape::Record(record) => self.clone_record(value, record, identity),
            Shape::Anonymous(obj) => self.clone_anonymous(value, obj, identity),
            Shape::Object(obj) => self.clone_object(value, obj, identity),
            Shape::Null | Shape::MultiArray(_) | Shape::Scalar => Ok(value.clone()),
        }
    }

    /// Clone identity of a reference value
    ///
    /// General objects whose class tags a primary identifier are identified
    /// by that member's value when it is set; everything else by address.
    fn identity_of(
        &mut self,
        value: &Value,
        shape: Shape<'_>,
    ) -> CloneResult<Option<CloneIdentity>> {
        if let Shape::Object(obj) = shape {
            let class = obj.class();
            let members = self.descriptors(class);
            if let Some(primary) = members.primary_identifier().filter(|m| m.can_get()) {
                let key = primary.get_value(value)?;
                if !key.is_null() {
                    return Ok(Some(CloneIdentity::Primary {
                        class: class.id(),
                        key: Key::new(key),
                    }));
                }
            }
        }
        Ok(value.identity().map(CloneIdentity::Reference))
    }

    fn descriptors(&mut self, class: &Class) -> Arc<DescriptorSet> {
        self.descriptors_for(class, self.settings.member_kind)
    }

    fn descriptors_for(&mut self, class: &Class, kind: MemberKind) -> Arc<DescriptorSet> {
        let settings = self.settings;
        let set = self
            .resolved
            .entry((class.id(), kind))
            .or_insert_with(|| resolve(class, &settings.ignore, kind, settings.cache()));
        Arc::clone(set)
    }

    fn clone_array(
        &mut self,
        source: &Value,
        array: &ArrayRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let copy = ArrayRef::new(array.element_type().clone(), array.len());
        self.identities
            .insert(identity, source, Value::Array(copy.clone()));

        for (index, item) in array.items().iter().enumerate() {
            let item = self.clone_value(item)?;
            copy.set(index, item)?;
        }
        Ok(Value::Array(copy))
    }

    fn clone_list(
        &mut self,
        source: &Value,
        list: &ListRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let copy = match list.class() {
            Some(class) => ListRef::of_class(class, list.capacity()),
            None => ListRef::with_capacity(list.capacity()),
        };
        let copy_value = Value::List(copy.clone());
        self.identities.insert(identity, source, copy_value.clone());

        for item in list.items().iter() {
            let item = self.clone_value(item)?;
            copy.push(item);
        }

        // Specialized sequences carry declared members of their own
        if let Some(class) = list.class() {
            self.populate(source, &copy_value, class, CloneLevel::Full, &SEQUENCE_CONTRACT)?;
        }
        Ok(copy_value)
    }

    fn clone_map(
        &mut self,
        source: &Value,
        map: &MapRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let copy = match map.class() {
            Some(class) => MapRef::of_class(class),
            None => MapRef::new(),
        };
        self.identities
            .insert(identity, source, Value::Map(copy.clone()));

        // Keys are reused as they are; only values are cloned
        for (key, item) in map.entries() {
            let item = self.clone_value(&item)?;
            copy.insert_key(key, item);
        }
        Ok(Value::Map(copy))
    }

    fn clone_record(
        &mut self,
        source: &Value,
        record: &RecordRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let copy = RecordRef::new();
        self.identities
            .insert(identity, source, Value::Record(copy.clone()));

        for (name, item) in record.entries() {
            let item = self.clone_value(&item)?;
            copy.try_insert(name, item);
        }
        Ok(Value::Record(copy))
    }

    /// Anonymous records have no constructor, so they become open records
    fn clone_anonymous(
        &mut self,
        source: &Value,
        obj: &ObjectRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let copy = RecordRef::new();
        self.identities
            .insert(identity, source, Value::Record(copy.clone()));

        let members = self.descriptors(obj.class());
        for member in members.iter().filter(|m| m.can_get() && !m.is_ignored()) {
            let item = member.get_value(source)?;
            let item = self.clone_value(&item)?;
            copy.try_insert(Arc::clone(member.name()), item);
        }
        Ok(Value::Record(copy))
    }

    fn clone_object(
        &mut self,
        source: &Value,
        obj: &ObjectRef,
        identity: CloneIdentity,
    ) -> CloneResult<Value> {
        let class = obj.class();
        let copy = self
            .settings
            .create_instance(class)
            .inspect_err(|e| debug!(class = class.name(), error = %e, "instantiation failed"))?;
        trace!(class = class.name(), "created instance");

        self.identities.insert(identity, source, copy.clone());
        self.populate(source, &copy, class, self.settings.level, &[])?;
        Ok(copy)
    }

    /// Copy the members of `class` from `source` onto `target`
    ///
    /// With [`MemberKind::Both`] the accessor pairs are copied first, then
    /// the storage fields whose names no accessor pair covers.
    fn populate(
        &mut self,
        source: &Value,
        target: &Value,
        class: &Class,
        level: CloneLevel,
        exclude: &[&str],
    ) -> CloneResult<()> {
        match self.settings.member_kind {
            MemberKind::Both => {
                let properties = self.descriptors_for(class, MemberKind::Properties);
                let fields = self.descriptors_for(class, MemberKind::Fields);
                self.copy_members(source, target, &properties, None, level, exclude)?;
                self.copy_members(source, target, &fields, Some(&*properties), level, exclude)
            }
            kind => {
                let members = self.descriptors_for(class, kind);
                self.copy_members(source, target, &members, None, level, exclude)
            }
        }
    }

    fn copy_members(
        &mut self,
        source: &Value,
        target: &Value,
        members: &DescriptorSet,
        covered: Option<&DescriptorSet>,
        level: CloneLevel,
        exclude: &[&str],
    ) -> CloneResult<()> {
        for member in members.iter() {
            let name: &str = member.name();
            if !member.is_readable()
                || member.is_ignored()
                || exclude.contains(&name)
                || covered.is_some_and(|set| set.contains(name))
            {
                continue;
            }

            let value = member.get_value(source)?;
            if value.is_null() {
                continue;
            }
            let copy = if member.is_scalar() || value.is_scalar() {
                value
            } else if level == CloneLevel::FirstLevelOnly {
                continue;
            } else {
                self.clone_value(&value)?
            };
            member.set_value(target, copy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedDescriptorCache;
    use graphclone_model::{AccessError, FieldDef, InstantiateError, PrimaryIdentifier, TypeRef};

    fn settings() -> CloneSettings {
        CloneSettings::new().with_cache(Arc::new(SharedDescriptorCache::new()))
    }

    fn node_class() -> Arc<Class> {
        Class::builder("Node")
            .auto_property("label", TypeRef::Str)
            .auto_property("next", TypeRef::class("Node"))
            .build()
    }

    fn node(class: &Arc<Class>, label: &str) -> ObjectRef {
        let node = ObjectRef::new(class);
        node.set_property("label", label).unwrap();
        node
    }

    #[test]
    fn test_object_copy_is_independent() {
        let class = node_class();
        let source = node(&class, "a");
        let copy = deep_clone_with(&Value::Object(source.clone()), &settings()).unwrap();
        let copy = copy.as_object().unwrap();

        assert!(!copy.ptr_eq(&source));
        assert_eq!(copy.property("label").unwrap().as_str(), Some("a"));

        copy.set_property("label", "b").unwrap();
        assert_eq!(source.property("label").unwrap().as_str(), Some("a"));
    }

    #[test]
    fn test_self_cycle_closes_on_copy() {
        let class = node_class();
        let source = node(&class, "loop");
        source.set_property("next", source.clone()).unwrap();

        let copy = deep_clone_with(&Value::Object(source.clone()), &settings()).unwrap();
        let copy = copy.as_object().unwrap();
        let next = copy.property("next").unwrap();

        assert!(next.as_object().unwrap().ptr_eq(copy));
        assert!(!copy.ptr_eq(&source));
    }

    #[test]
    fn test_identity_registered_before_population_for_lists() {
        let list = ListRef::new();
        list.push(Value::List(list.clone()));

        let copy = deep_clone_with(&Value::List(list.clone()), &settings()).unwrap();
        let copy = copy.as_list().unwrap();
        assert!(copy.get(0).unwrap().as_list().unwrap().ptr_eq(copy));
    }

    #[test]
    fn test_primary_identifier_merges_instances() {
        let class = Class::builder("User")
            .add_field(FieldDef::new("id", TypeRef::Int).tag(PrimaryIdentifier))
            .field("name", TypeRef::Str)
            .build();
        let a = ObjectRef::new(&class);
        a.set_field("id", 1i64).unwrap();
        let b = ObjectRef::new(&class);
        b.set_field("id", 1i64).unwrap();
        let pair = ListRef::from_values(vec![Value::Object(a), Value::Object(b)]);

        let settings = settings().with_member_kind(MemberKind::Fields);
        let copy = deep_clone_with(&Value::List(pair), &settings).unwrap();
        let copy = copy.as_list().unwrap();

        let first = copy.get(0).unwrap();
        let second = copy.get(1).unwrap();
        assert!(first.is_same(&second));
    }

    #[test]
    fn test_null_primary_identifier_falls_back_to_reference() {
        let class = Class::builder("Draft")
            .add_field(FieldDef::new("id", TypeRef::Int).tag(PrimaryIdentifier))
            .build();
        let pair = ListRef::from_values(vec![
            Value::Object(ObjectRef::new(&class)),
            Value::Object(ObjectRef::new(&class)),
        ]);

        let settings = settings().with_member_kind(MemberKind::Fields);
        let copy = deep_clone_with(&Value::List(pair), &settings).unwrap();
        let copy = copy.as_list().unwrap();
        assert!(!copy.get(0).unwrap().is_same(&copy.get(1).unwrap()));
    }

    #[test]
    fn test_instantiation_failure_aborts() {
        let class = Class::builder("Sealed")
            .auto_property("x", TypeRef::Int)
            .no_default_constructor()
            .build();
        let err = deep_clone_with(&Value::Object(ObjectRef::new(&class)), &settings())
            .unwrap_err();
        assert!(matches!(
            err,
            CloneError::Instantiation(InstantiateError::NoConstructor { .. })
        ));
    }

    #[test]
    fn test_accessor_failure_aborts() {
        let class = Class::builder("Faulty")
            .property(
                graphclone_model::PropertyDef::new("boom", TypeRef::Int)
                    .getter(|_| Err(AccessError::Failed("getter exploded".into())))
                    .setter(|_, _| Ok(())),
            )
            .build();
        let err = deep_clone_with(&Value::Object(ObjectRef::new(&class)), &settings())
            .unwrap_err();
        assert!(matches!(err, CloneError::Access(AccessError::Member { .. })));
    }

    #[test]
    fn test_clone_into_rejects_other_class() {
        let cloner = DeepCloner::new(settings());
        let a = Value::Object(ObjectRef::new(&node_class()));
        let leaf = Class::builder("Leaf").build();
        let b = Value::Object(ObjectRef::new(&leaf));
        let err = cloner.clone_into(&a, &b).unwrap_err();
        assert_eq!(err.to_string(), "Cannot clone a Node into a Leaf");

        // Same name, different class
        let c = Value::Object(ObjectRef::new(&node_class()));
        assert!(cloner.clone_into(&a, &c).is_err());

        let err = cloner.clone_into(&a, &Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot clone a Node into a int");
    }
}
