//! Object model integration tests
//!
//! Exercises classes, heap handles and structural comparison together, the
//! way the cloning engine drives them.

use std::sync::Arc;
use std::thread;

use graphclone_model::{
    AccessError, ArrayRef, Class, ClassKind, CloneIgnore, FieldDef, Handle, InstantiateError,
    Key, ListRef, MapRef, ObjectRef, PropertyDef, RecordRef, Tags, TypeRef, Value,
    SEQUENCE_CONTRACT,
};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_model_types_are_thread_safe() {
    assert_send_sync::<Value>();
    assert_send_sync::<Class>();
    assert_send_sync::<ObjectRef>();
    assert_send_sync::<ListRef>();
    assert_send_sync::<MapRef>();
    assert_send_sync::<ArrayRef>();
    assert_send_sync::<RecordRef>();
}

#[test]
fn test_instances_are_shared_across_threads() {
    let class = Class::builder("Counter")
        .add_field(FieldDef::new("hits", TypeRef::Int).with_default(0i64))
        .build();
    let counter = ObjectRef::new(&class);
    let list = ListRef::new();

    thread::scope(|scope| {
        for i in 0..4i64 {
            let list = &list;
            scope.spawn(move || list.push(i));
        }
    });
    counter.set_field("hits", list.len() as i64).unwrap();

    assert_eq!(list.len(), 4);
    assert_eq!(counter.field("hits").unwrap().as_int(), Some(4));
}

#[test]
fn test_auto_property_and_field_share_storage() {
    let class = Class::builder("Person")
        .auto_property("name", TypeRef::Str)
        .build();
    let person = ObjectRef::new(&class);

    person.set_property("name", "Ada").unwrap();
    assert_eq!(person.field("name").unwrap().as_str(), Some("Ada"));

    person.set_field("name", "Grace").unwrap();
    assert_eq!(person.property("name").unwrap().as_str(), Some("Grace"));
}

#[test]
fn test_unknown_members() {
    let class = Class::builder("Empty").build();
    let empty = ObjectRef::new(&class);

    assert_eq!(
        empty.field("nope").unwrap_err(),
        AccessError::UnknownMember {
            class: "Empty".to_string(),
            member: "nope".to_string(),
        }
    );
    assert!(empty.set_property("nope", 1i64).is_err());
}

#[test]
fn test_sequence_class_instances() {
    let playlist = Class::builder("Playlist")
        .sequence()
        .auto_property("title", TypeRef::Str)
        .build();
    assert_eq!(playlist.kind(), ClassKind::Sequence);
    for name in SEQUENCE_CONTRACT {
        assert!(playlist.property(name).is_some());
    }

    let list = playlist.instantiate().unwrap();
    let list = list.as_list().unwrap();
    list.push("song");
    list.set_field("title", "Mix").unwrap();

    let len = playlist.property("len").unwrap();
    assert_eq!(len.get(&Value::List(list.clone())).unwrap().as_uint(), Some(1));
    assert!(Arc::ptr_eq(list.class().unwrap(), &playlist));
}

#[test]
fn test_anonymous_classes_cannot_be_instantiated() {
    let shape = Class::anonymous(&[("x", TypeRef::Int), ("y", TypeRef::Int)]);
    assert_eq!(shape.kind(), ClassKind::Anonymous);
    assert_eq!(shape.name(), "{ x, y }");
    assert!(matches!(
        shape.instantiate(),
        Err(InstantiateError::NoConstructor { .. })
    ));

    let point = ObjectRef::with_slots(&shape, vec![Value::Int(1), Value::Int(2)]).unwrap();
    assert_eq!(point.property("y").unwrap().as_int(), Some(2));
    assert!(point.set_property("y", 3i64).is_err());
    assert!(ObjectRef::with_slots(&shape, vec![Value::Int(1)]).is_err());
}

#[test]
fn test_property_tags_travel_with_definitions() {
    let class = Class::builder("Cache")
        .tagged_auto_property("blob", TypeRef::Any, Tags::new().with(CloneIgnore))
        .property(PropertyDef::new("size", TypeRef::UInt).tag(CloneIgnore))
        .build();

    assert!(class.field("blob").unwrap().tags().contains::<CloneIgnore>());
    assert!(class.property("blob").unwrap().tags().contains::<CloneIgnore>());
    assert!(class.property("size").unwrap().tags().contains::<CloneIgnore>());
}

#[test]
fn test_map_keys_by_identity_and_by_value() {
    let class = Class::builder("Token").build();
    let a = Value::Object(ObjectRef::new(&class));
    let b = Value::Object(ObjectRef::new(&class));
    let map = MapRef::new();
    map.insert(a.clone(), 1i64);
    map.insert(b.clone(), 2i64);
    map.insert("k", 3i64);

    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&a).unwrap().as_int(), Some(1));
    assert_eq!(map.get(&Value::str("k")).unwrap().as_int(), Some(3));
    assert_eq!(Key::new(Value::str("k")), Key::new(Value::str("k")));
    assert_ne!(Key::new(a), Key::new(b));
}

#[test]
fn test_multi_dimensional_arrays() {
    let grid = ArrayRef::multi(TypeRef::Float, &[2, 3]);
    grid.set_at(&[1, 2], 0.5).unwrap();

    assert_eq!(grid.rank(), 2);
    assert_eq!(grid.len(), 6);
    assert_eq!(grid.get(5).unwrap().as_float(), Some(0.5));
    assert!(grid.get_at(&[2, 0]).is_err());

    let copy = grid.shallow_copy();
    assert!(!copy.ptr_eq(&grid));
    assert_eq!(copy.get_at(&[1, 2]).unwrap().as_float(), Some(0.5));
}

#[test]
fn test_structural_equality_on_cyclic_graphs() {
    let class = Class::builder("Node")
        .auto_property("next", TypeRef::class("Node"))
        .build();
    let a = ObjectRef::new(&class);
    a.set_property("next", a.clone()).unwrap();
    let b = ObjectRef::new(&class);
    b.set_property("next", b.clone()).unwrap();

    assert!(Value::Object(a.clone()).structurally_eq(&Value::Object(b)));

    let other = Class::builder("Node")
        .auto_property("next", TypeRef::class("Node"))
        .build();
    let c = ObjectRef::new(&other);
    assert!(!Value::Object(a).structurally_eq(&Value::Object(c)));
}

#[test]
fn test_handles_compare_by_resource() {
    let socket = Handle::new("socket", 8080u16);
    let same = socket.clone();
    let other = Handle::new("socket", 8080u16);

    assert!(Value::Handle(socket.clone()).is_same(&Value::Handle(same)));
    assert!(!Value::Handle(socket.clone()).is_same(&Value::Handle(other)));
    assert_eq!(socket.downcast_ref::<u16>(), Some(&8080));
}

#[test]
fn test_replace_slots_checks_the_count() {
    let class = Class::builder("Pair")
        .field("a", TypeRef::Int)
        .field("b", TypeRef::Int)
        .build();
    let pair = ObjectRef::new(&class);
    pair.set_field("a", 1i64).unwrap();
    let snapshot = pair.slots();
    pair.set_field("a", 9i64).unwrap();

    assert!(pair.replace_slots(vec![Value::Int(0)]).is_err());
    pair.replace_slots(snapshot).unwrap();
    assert_eq!(pair.field("a").unwrap().as_int(), Some(1));
}
