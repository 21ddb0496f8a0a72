use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use graphclone::model::{Class, ListRef, MapRef, ObjectRef, TypeRef, Value};
use graphclone::{deep_clone_with, CloneLevel, CloneSettings, MemberKind};

fn node_class() -> Arc<Class> {
    Class::builder("Node")
        .auto_property("label", TypeRef::Str)
        .auto_property("weight", TypeRef::Float)
        .auto_property("left", TypeRef::class("Node"))
        .auto_property("right", TypeRef::class("Node"))
        .build()
}

fn node(class: &Arc<Class>, label: &str) -> ObjectRef {
    let node = ObjectRef::new(class);
    node.set_property("label", label).unwrap();
    node.set_property("weight", 1.5).unwrap();
    node
}

/// Singly linked through `left`, with the tail pointing back at the head
fn ring(class: &Arc<Class>, len: usize) -> Value {
    let head = node(class, "0");
    let mut tail = head.clone();
    for i in 1..len {
        let next = node(class, &i.to_string());
        tail.set_property("left", next.clone()).unwrap();
        tail = next;
    }
    tail.set_property("left", head.clone()).unwrap();
    Value::Object(head)
}

fn tree(class: &Arc<Class>, depth: usize) -> ObjectRef {
    let root = node(class, "n");
    if depth > 0 {
        root.set_property("left", tree(class, depth - 1)).unwrap();
        root.set_property("right", tree(class, depth - 1)).unwrap();
    }
    root
}

fn bench_ring(c: &mut Criterion) {
    let class = node_class();
    let mut group = c.benchmark_group("ring");

    for len in [10usize, 100, 1000] {
        let source = ring(&class, len);
        let settings = CloneSettings::new();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("properties", len), &source, |b, source| {
            b.iter(|| deep_clone_with(black_box(source), &settings).unwrap());
        });
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let class = node_class();
    let source = Value::Object(tree(&class, 10));
    let mut group = c.benchmark_group("tree");

    for (name, settings) in [
        ("properties", CloneSettings::new()),
        ("fields", CloneSettings::new().with_member_kind(MemberKind::Fields)),
        ("both", CloneSettings::new().with_member_kind(MemberKind::Both)),
        (
            "first_level_only",
            CloneSettings::new().with_level(CloneLevel::FirstLevelOnly),
        ),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| deep_clone_with(black_box(&source), &settings).unwrap());
        });
    }

    group.finish();
}

fn bench_containers(c: &mut Criterion) {
    let class = node_class();
    let items: Vec<Value> = (0..500)
        .map(|i| Value::Object(node(&class, &i.to_string())))
        .collect();
    let list = Value::List(ListRef::from_values(items.clone()));
    let map = MapRef::new();
    for (i, item) in items.into_iter().enumerate() {
        map.insert(i as i64, item);
    }
    let map = Value::Map(map);
    let settings = CloneSettings::new();

    c.bench_function("list_of_500", |b| {
        b.iter(|| deep_clone_with(black_box(&list), &settings).unwrap());
    });
    c.bench_function("map_of_500", |b| {
        b.iter(|| deep_clone_with(black_box(&map), &settings).unwrap());
    });
}

criterion_group!(benches, bench_ring, bench_tree, bench_containers);
criterion_main!(benches);
