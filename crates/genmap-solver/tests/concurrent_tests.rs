//! Concurrent registration stress tests.
//! Races many threads on cold registries and checks that every type is
//! computed once and every caller sees the same published record.

use crate::fixtures::{member, registry_for, sample_graph, ty};
use crate::{
    AncestorData, GenericParameterMapping, OverrideResolver, TypeGraphBuilder, TypeKey,
    TypeRegistry,
};
use rayon::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_register_same_type() {
    let graph = sample_graph();
    let registry = Arc::new(registry_for(&graph));
    let target = ty(&graph, "Drived$1");
    let num_threads = 16;
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for _ in 0..num_threads {
        let r = Arc::clone(&registry);
        let b = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            b.wait();
            r.register(target).expect("sample hierarchy resolves")
        }));
    }

    let results: Vec<Arc<AncestorData>> = handles
        .into_iter()
        .map(|handle| handle.join().expect("registration thread panicked"))
        .collect();

    let first = &results[0];
    for result in &results[1..] {
        assert!(Arc::ptr_eq(first, result));
    }
    // Drived$1 and its six ancestors, each computed exactly once.
    assert_eq!(registry.computed_count(), 7);
    assert_eq!(registry.computed_count(), registry.len() as u64);
}

#[test]
fn test_concurrent_register_every_type() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let keys: Vec<TypeKey> = graph.keys().collect();

    // Every thread walks every type, hitting both cold and warm paths.
    let per_thread: Vec<Vec<Arc<AncestorData>>> = (0..8)
        .into_par_iter()
        .map(|_| {
            keys.iter()
                .map(|&key| registry.register(key).expect("sample hierarchy resolves"))
                .collect()
        })
        .collect();

    for results in &per_thread[1..] {
        for (a, b) in per_thread[0].iter().zip(results) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
    assert_eq!(registry.len(), keys.len());
    assert_eq!(registry.computed_count(), keys.len() as u64);
}

#[test]
fn test_concurrent_queries_on_deep_chain() {
    // class C0<T>; class Cn<T> extends C(n-1)<T>; every level shares one slot.
    let mut b = TypeGraphBuilder::new();
    let root = b.class("C0", &["T"]);
    let mut levels = vec![root];
    for depth in 1..64 {
        let level = b.class(&format!("C{depth}"), &["T"]);
        b.extends(level, levels[depth - 1], [b.slot(level, 0)]);
        levels.push(level);
    }
    let graph = Arc::new(b.build());
    let registry = TypeRegistry::new(graph.clone());

    levels.par_iter().rev().for_each(|&level| {
        assert_eq!(
            registry.mapping_for(level, root, 0),
            Ok(GenericParameterMapping::DerivedIndex(0))
        );
    });
    assert_eq!(registry.computed_count(), levels.len() as u64);
}

#[test]
fn test_concurrent_override_queries() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let map_put = member(&graph, "Map", "put", &["K", "V"]);
    let candidates = [
        (member(&graph, "Drived", "put", &["Object", "Object"]), true),
        (member(&graph, "Drived", "put", &["Number", "Integer"]), false),
        (member(&graph, "Drived2", "put", &["Double", "Integer"]), true),
        (member(&graph, "HashMap", "put", &["K", "V"]), true),
    ];

    (0..64).into_par_iter().for_each(|round| {
        let resolver = OverrideResolver::new(&registry);
        let (derived, expected) = &candidates[round % candidates.len()];
        assert_eq!(resolver.overrides(&map_put, derived), Ok(*expected));
    });
}
