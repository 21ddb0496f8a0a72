//! Member descriptors
//!
//! A [`MemberDescriptor`] is the uniform view the cloner has of one named
//! member of a class, whether the class stores it in a slot (a field) or
//! exposes it through a getter/setter pair (a property). Capability flags
//! are derived once, at construction, from the member's declaration.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use graphclone_model::{
    AccessError, CloneIgnore, FieldDef, Getter, PrimaryIdentifier, PropertyDef, Setter, Tags,
    TypeRef, Value,
};

/// Where a member comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSource {
    /// Storage field
    Field,
    /// Accessor pair
    Property,
}

#[derive(Clone)]
enum Accessor {
    Slot(usize),
    Pair {
        getter: Option<Getter>,
        setter: Option<Setter>,
    },
}

/// Immutable metadata and accessors for one member
#[derive(Clone)]
pub struct MemberDescriptor {
    name: Arc<str>,
    ty: TypeRef,
    source: MemberSource,
    readable: bool,
    writable: bool,
    ignored: bool,
    primary_identifier: bool,
    scalar: bool,
    accessor: Accessor,
    tags: Tags,
}

impl MemberDescriptor {
    /// Describe a storage field
    ///
    /// Read-only, constant and handle-typed fields are neither readable nor
    /// writable for cloning purposes.
    pub fn from_field(field: &FieldDef) -> Self {
        let readable = !(field.is_readonly() || field.is_constant() || field.ty().is_handle());
        Self {
            name: field.name().clone(),
            ty: field.ty().clone(),
            source: MemberSource::Field,
            readable,
            writable: readable,
            ignored: field.tags().contains::<CloneIgnore>(),
            primary_identifier: field.tags().contains::<PrimaryIdentifier>(),
            scalar: field.ty().is_scalar(),
            accessor: Accessor::Slot(field.slot()),
            tags: field.tags().clone(),
        }
    }

    /// Describe an accessor pair
    ///
    /// A property is readable only when both halves exist, it takes no index
    /// parameters and its type is not a handle.
    pub fn from_property(property: &PropertyDef) -> Self {
        let readable = property.has_getter()
            && property.has_setter()
            && !property.is_indexed()
            && !property.ty().is_handle();
        Self {
            name: property.name().clone(),
            ty: property.ty().clone(),
            source: MemberSource::Property,
            readable,
            writable: property.has_setter(),
            ignored: property.tags().contains::<CloneIgnore>(),
            primary_identifier: property.tags().contains::<PrimaryIdentifier>(),
            scalar: property.ty().is_scalar(),
            accessor: Accessor::Pair {
                getter: property.getter_fn().cloned(),
                setter: property.setter_fn().cloned(),
            },
            tags: property.tags().clone(),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Declared type
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn source(&self) -> MemberSource {
        self.source
    }

    /// Can be both read from a source and written to a copy
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// A value can be read at all, even if the member cannot be copied
    pub fn can_get(&self) -> bool {
        match &self.accessor {
            Accessor::Slot(_) => true,
            Accessor::Pair { getter, .. } => getter.is_some(),
        }
    }

    /// Tagged to be excluded from cloning
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Tagged as the instance's clone identity
    pub fn is_primary_identifier(&self) -> bool {
        self.primary_identifier
    }

    /// Declared type is immutable or opaque
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    /// Check for a tag of type `T`
    pub fn has_tag<T: Any>(&self) -> bool {
        self.tags.contains::<T>()
    }

    /// Fetch the tag of type `T`
    pub fn tag<T: Any>(&self) -> Option<&T> {
        self.tags.get::<T>()
    }

    /// Read the member from `instance`
    pub fn get_value(&self, instance: &Value) -> Result<Value, AccessError> {
        let result = match &self.accessor {
            Accessor::Slot(slot) => instance.read_slot(*slot),
            Accessor::Pair {
                getter: Some(getter),
                ..
            } => getter(instance),
            Accessor::Pair { getter: None, .. } => Err(AccessError::NoGetter {
                member: self.name.to_string(),
            }),
        };
        result.map_err(|e| e.for_member(&self.name))
    }

    /// Write the member on `instance`
    pub fn set_value(&self, instance: &Value, value: Value) -> Result<(), AccessError> {
        let result = match &self.accessor {
            Accessor::Slot(slot) => instance.write_slot(*slot, value),
            Accessor::Pair {
                setter: Some(setter),
                ..
            } => setter(instance, value),
            Accessor::Pair { setter: None, .. } => Err(AccessError::NoSetter {
                member: self.name.to_string(),
            }),
        };
        result.map_err(|e| e.for_member(&self.name))
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("source", &self.source)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("ignored", &self.ignored)
            .field("primary_identifier", &self.primary_identifier)
            .finish()
    }
}
