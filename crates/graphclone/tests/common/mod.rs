//! Shared fixtures for graphclone integration tests

#![allow(dead_code)]

use std::sync::Arc;

use graphclone::model::{Class, ListRef, ObjectRef, TypeRef, Value};
use graphclone::{CloneSettings, SharedDescriptorCache};

/// Route engine logs to the test harness; set `RUST_LOG=graphclone=trace`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Settings with a private cache so tests never observe each other
pub fn isolated() -> CloneSettings {
    init_tracing();
    CloneSettings::new().with_cache(Arc::new(SharedDescriptorCache::new()))
}

/// `Person { name, age, friend, nicknames }`, all auto-properties
pub fn person_class() -> Arc<Class> {
    Class::builder("Person")
        .auto_property("name", TypeRef::Str)
        .auto_property("age", TypeRef::Int)
        .auto_property("friend", TypeRef::class("Person"))
        .auto_property("nicknames", TypeRef::list(TypeRef::Str))
        .build()
}

pub fn person(class: &Arc<Class>, name: &str, age: i64) -> ObjectRef {
    let person = ObjectRef::new(class);
    person.set_property("name", name).unwrap();
    person.set_property("age", age).unwrap();
    person
}

/// `Node { label, left, right }`, all auto-properties
pub fn node_class() -> Arc<Class> {
    Class::builder("Node")
        .auto_property("label", TypeRef::Str)
        .auto_property("left", TypeRef::class("Node"))
        .auto_property("right", TypeRef::class("Node"))
        .build()
}

pub fn node(class: &Arc<Class>, label: &str) -> ObjectRef {
    let node = ObjectRef::new(class);
    node.set_property("label", label).unwrap();
    node
}

pub fn strings(values: &[&str]) -> Value {
    Value::List(ListRef::from_values(
        values.iter().map(|s| Value::str(s)).collect(),
    ))
}

pub fn obj(value: &Value) -> &ObjectRef {
    value.as_object().expect("expected an object")
}
