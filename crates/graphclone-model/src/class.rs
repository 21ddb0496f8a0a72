//! Class metadata
//!
//! A [`Class`] describes the runtime shape of its instances: the storage
//! fields each instance carries, the accessor pairs (properties) it exposes,
//! how a fresh instance is constructed, and the tags attached to all of them.
//! A member may be exposed both ways under the same name, which is what
//! [`ClassBuilder::auto_property`] declares.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{AccessError, InstantiateError};
use crate::heap::{ListRef, MapRef, ObjectRef};
use crate::tags::Tags;
use crate::types::TypeRef;
use crate::value::Value;

/// Process-unique class identifier
pub type ClassId = u64;

/// Global counter for generating class IDs
static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

fn generate_class_id() -> ClassId {
    NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)
}

/// Property getter bound to one member
pub type Getter = Arc<dyn Fn(&Value) -> Result<Value, AccessError> + Send + Sync>;

/// Property setter bound to one member
pub type Setter = Arc<dyn Fn(&Value, Value) -> Result<(), AccessError> + Send + Sync>;

/// Custom constructor
pub type ConstructorFn = Arc<dyn Fn(&Arc<Class>) -> Result<Value, InstantiateError> + Send + Sync>;

/// Members every sequence class inherits from the built-in list
pub const SEQUENCE_CONTRACT: [&str; 2] = ["len", "capacity"];

/// Built-in list class; the members it declares form the sequence contract
static SEQUENCE_BASE: Lazy<Arc<Class>> = Lazy::new(|| Class::builder("List").sequence().build());

/// What an instance of the class looks like at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Plain object with slots
    Object,
    /// List subtype; instances are [`ListRef`]s
    Sequence,
    /// Map subtype; instances are [`MapRef`]s
    Mapping,
    /// Structural record type without an independent name
    Anonymous,
}

// ============================================================================
// Fields
// ============================================================================

/// Declared storage field
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: Arc<str>,
    ty: TypeRef,
    slot: usize,
    readonly: bool,
    constant: bool,
    default: Value,
    tags: Tags,
}

impl FieldDef {
    /// Create a writable field with a null default
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: Arc::from(name),
            ty,
            slot: 0,
            readonly: false,
            constant: false,
            default: Value::Null,
            tags: Tags::new(),
        }
    }

    /// Mark as assignable only at construction
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Mark as a compile-time constant
    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    /// Value the slot holds on a fresh instance
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Attach a tag
    pub fn tag<T: std::any::Any + Send + Sync>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Replace the tag collection
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Slot index within an instance
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Declared accessor pair
#[derive(Clone)]
pub struct PropertyDef {
    name: Arc<str>,
    ty: TypeRef,
    getter: Option<Getter>,
    setter: Option<Setter>,
    indexed: bool,
    tags: Tags,
}

impl PropertyDef {
    /// Create a property with neither accessor
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: Arc::from(name),
            ty,
            getter: None,
            setter: None,
            indexed: false,
            tags: Tags::new(),
        }
    }

    /// Bind the getter
    pub fn getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(f));
        self
    }

    /// Bind the setter
    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, Value) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(f));
        self
    }

    /// Mark as an indexer (takes parameters, so it cannot be copied)
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Attach a tag
    pub fn tag<T: std::any::Any + Send + Sync>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Replace the tag collection
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn getter_fn(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    pub fn setter_fn(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    /// Invoke the getter on `instance`
    pub fn get(&self, instance: &Value) -> Result<Value, AccessError> {
        match &self.getter {
            Some(getter) => getter(instance),
            None => Err(AccessError::NoGetter {
                member: self.name.to_string(),
            }),
        }
    }

    /// Invoke the setter on `instance`
    pub fn set(&self, instance: &Value, value: Value) -> Result<(), AccessError> {
        match &self.setter {
            Some(setter) => setter(instance, value),
            None => Err(AccessError::NoSetter {
                member: self.name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("indexed", &self.indexed)
            .finish()
    }
}

// ============================================================================
// Classes
// ============================================================================

/// How fresh instances are produced
#[derive(Clone)]
pub enum Constructor {
    /// Allocate with every field at its default
    Default,
    /// Call a custom function
    Custom(ConstructorFn),
    /// The class cannot be constructed without arguments
    Unavailable,
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constructor::Default => write!(f, "Default"),
            Constructor::Custom(_) => write!(f, "Custom"),
            Constructor::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Runtime class definition
pub struct Class {
    id: ClassId,
    name: Arc<str>,
    kind: ClassKind,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    constructor: Constructor,
    immutable: bool,
    tags: Tags,
}

impl Class {
    /// Start defining a class
    pub fn builder(name: &str) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Define an anonymous record type
    ///
    /// Each member becomes a read-only field paired with a getter-only
    /// property of the same name. Anonymous types have no constructor.
    ///
    /// Every call yields a new class with a fresh id, even for identical
    /// member lists. Define shapes once and reuse them; descriptor caches
    /// keep one entry per class id.
    pub fn anonymous(members: &[(&str, TypeRef)]) -> Arc<Class> {
        let names: Vec<&str> = members.iter().map(|(name, _)| *name).collect();
        let mut builder = ClassBuilder::new(&format!("{{ {} }}", names.join(", ")));
        builder.kind = ClassKind::Anonymous;
        builder.constructor = Constructor::Unavailable;
        for (name, ty) in members {
            let slot = builder.fields.len();
            builder = builder
                .add_field(FieldDef::new(name, ty.clone()).readonly())
                .property(
                    PropertyDef::new(name, ty.clone())
                        .getter(move |instance: &Value| instance.read_slot(slot)),
                );
        }
        builder.build()
    }

    /// The built-in list class
    pub fn sequence_base() -> &'static Arc<Class> {
        &SEQUENCE_BASE
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Storage fields in slot order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Instances are immutable values and are shared rather than copied
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Number of storage slots per instance
    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }

    /// Field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| &**f.name() == name)
    }

    /// Property by name
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| &**p.name() == name)
    }

    /// Produce a fresh instance through the class constructor
    pub fn instantiate(self: &Arc<Self>) -> Result<Value, InstantiateError> {
        match &self.constructor {
            Constructor::Default => match self.kind {
                ClassKind::Object => Ok(Value::Object(ObjectRef::new(self))),
                ClassKind::Sequence => Ok(Value::List(ListRef::of_class(self, 0))),
                ClassKind::Mapping => Ok(Value::Map(MapRef::of_class(self))),
                ClassKind::Anonymous => Err(InstantiateError::NoConstructor {
                    class: self.name.to_string(),
                }),
            },
            Constructor::Custom(construct) => construct(self),
            Constructor::Unavailable => Err(InstantiateError::NoConstructor {
                class: self.name.to_string(),
            }),
        }
    }

    pub(crate) fn field_slot(&self, name: &str) -> Result<usize, AccessError> {
        self.field(name)
            .map(FieldDef::slot)
            .ok_or_else(|| self.unknown_member(name))
    }

    pub(crate) fn require_property(&self, name: &str) -> Result<&PropertyDef, AccessError> {
        self.property(name).ok_or_else(|| self.unknown_member(name))
    }

    fn unknown_member(&self, name: &str) -> AccessError {
        AccessError::UnknownMember {
            class: self.name.to_string(),
            member: name.to_string(),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("fields", &self.fields.iter().map(|x| x.name()).collect::<Vec<_>>())
            .field(
                "properties",
                &self.properties.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn sequence_contract() -> Vec<PropertyDef> {
    let not_a_list = |other: &Value| AccessError::NotAnInstance {
        got: other.kind_name().to_string(),
    };
    vec![
        PropertyDef::new("len", TypeRef::UInt).getter(move |instance: &Value| match instance {
            Value::List(list) => Ok(Value::UInt(list.len() as u64)),
            other => Err(not_a_list(other)),
        }),
        PropertyDef::new("capacity", TypeRef::UInt).getter(move |instance: &Value| {
            match instance {
                Value::List(list) => Ok(Value::UInt(list.capacity() as u64)),
                other => Err(not_a_list(other)),
            }
        }),
    ]
}

// ============================================================================
// Builder
// ============================================================================

/// Incremental class definition
pub struct ClassBuilder {
    name: Arc<str>,
    kind: ClassKind,
    fields: Vec<FieldDef>,
    properties: Vec<PropertyDef>,
    constructor: Constructor,
    immutable: bool,
    tags: Tags,
}

impl ClassBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            kind: ClassKind::Object,
            fields: Vec::new(),
            properties: Vec::new(),
            constructor: Constructor::Default,
            immutable: false,
            tags: Tags::new(),
        }
    }

    /// Add a writable field with a null default
    pub fn field(self, name: &str, ty: TypeRef) -> Self {
        self.add_field(FieldDef::new(name, ty))
    }

    /// Add a fully configured field; its slot is the next free one
    pub fn add_field(mut self, mut field: FieldDef) -> Self {
        field.slot = self.fields.len();
        self.fields.push(field);
        self
    }

    /// Add a property backed by a field of the same name
    pub fn auto_property(self, name: &str, ty: TypeRef) -> Self {
        self.tagged_auto_property(name, ty, Tags::new())
    }

    /// Add a property backed by a field of the same name, both carrying `tags`
    pub fn tagged_auto_property(self, name: &str, ty: TypeRef, tags: Tags) -> Self {
        let slot = self.fields.len();
        self.add_field(FieldDef::new(name, ty.clone()).with_tags(tags.clone()))
            .property(
                PropertyDef::new(name, ty)
                    .with_tags(tags)
                    .getter(move |instance: &Value| instance.read_slot(slot))
                    .setter(move |instance: &Value, value| instance.write_slot(slot, value)),
            )
    }

    /// Add an accessor pair
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Make this a list subtype inheriting the sequence contract
    pub fn sequence(mut self) -> Self {
        self.kind = ClassKind::Sequence;
        for contract in sequence_contract() {
            if !self.properties.iter().any(|p| p.name() == contract.name()) {
                self.properties.push(contract);
            }
        }
        self
    }

    /// Make this a map subtype
    pub fn mapping(mut self) -> Self {
        self.kind = ClassKind::Mapping;
        self
    }

    /// Instances are immutable and shared instead of copied
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Construct instances with a custom function
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&Arc<Class>) -> Result<Value, InstantiateError> + Send + Sync + 'static,
    {
        self.constructor = Constructor::Custom(Arc::new(f));
        self
    }

    /// The class has no argument-free constructor
    pub fn no_default_constructor(mut self) -> Self {
        self.constructor = Constructor::Unavailable;
        self
    }

    /// Attach a class-level tag
    pub fn tag<T: std::any::Any + Send + Sync>(mut self, tag: T) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Finish the definition, assigning a fresh class ID
    pub fn build(self) -> Arc<Class> {
        Arc::new(Class {
            id: generate_class_id(),
            name: self.name,
            kind: self.kind,
            fields: self.fields,
            properties: self.properties,
            constructor: self.constructor,
            immutable: self.immutable,
            tags: self.tags,
        })
    }
}
