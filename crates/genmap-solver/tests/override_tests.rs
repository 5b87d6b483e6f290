use super::*;
use crate::error::ResolveError;
use crate::fixtures::{NO_PARAMS, capture_query_events, member, registry_for, sample_graph, ty};
use crate::{SlotRef, TypeGraph};

fn check(
    graph: &TypeGraph,
    registry: &TypeRegistry,
    base: &MemberSignature,
    derived: &MemberSignature,
) -> bool {
    OverrideResolver::new(registry)
        .overrides(base, derived)
        .unwrap_or_else(|err| {
            panic!(
                "{} vs {}: {err}",
                graph.display_member(base),
                graph.display_member(derived)
            )
        })
}

#[test]
fn test_overrides_sample_hierarchy() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let m = |owner: &str, name: &str, params: &[&str]| member(&graph, owner, name, params);

    let cases = [
        (m("Base", "getA", &[]), m("Drived", "getK", &[]), false),
        (m("Base", "getA", &[]), m("Drived", "getA", &[]), true),
        (m("Map", "put", &["K", "V"]), m("Drived", "put", &["Object", "Object"]), true),
        (m("Base", "getV", &["K", "A"]), m("Drived", "getV", &["Object", "Number"]), true),
        (m("Base", "getV", &["K", "A"]), m("Drived", "getV", &["int", "Object"]), false),
        (m("Map", "put", &["K", "V"]), m("Base", "put", &["A", "Integer"]), true),
        (m("Base", "put", &["A", "Integer"]), m("Drived", "put", &["Object", "Object"]), false),
        (m("Base", "put", &["A", "Integer"]), m("Drived", "put", &["Number", "Integer"]), true),
        (m("Map", "put", &["K", "V"]), m("Drived", "put", &["Number", "Integer"]), false),
        (m("Map", "put", &["K", "V"]), m("Drived2", "put", &["Double", "Integer"]), true),
    ];
    for (base, derived, expected) in &cases {
        assert_eq!(
            check(&graph, &registry, base, derived),
            *expected,
            "{} vs {}",
            graph.display_member(base),
            graph.display_member(derived)
        );
    }
}

#[test]
fn test_overrides_is_reflexive_and_asymmetric() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let map_put = member(&graph, "Map", "put", &["K", "V"]);
    let base_get_v = member(&graph, "Base", "getV", &["K", "A"]);
    let drived_put = member(&graph, "Drived", "put", &["Object", "Object"]);

    assert!(check(&graph, &registry, &map_put, &map_put));
    assert!(check(&graph, &registry, &base_get_v, &base_get_v));
    assert!(check(&graph, &registry, &map_put, &drived_put));
    assert!(!check(&graph, &registry, &drived_put, &map_put));
}

#[test]
fn test_overrides_requires_name_and_arity() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let map_get = member(&graph, "Map", "get", &["Object"]);
    let map_put = member(&graph, "Map", "put", &["K", "V"]);
    let hash_map_put = member(&graph, "HashMap", "put", &["K", "V"]);

    assert!(!check(&graph, &registry, &map_get, &hash_map_put));
    assert!(!check(&graph, &registry, &map_put, &map_get));
    assert!(check(&graph, &registry, &map_put, &hash_map_put));
}

#[test]
fn test_overrides_unrelated_types() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let drived_put = member(&graph, "Drived", "put", &["Number", "Integer"]);
    let drived2_put = member(&graph, "Drived2", "put", &["Double", "Integer"]);

    assert!(!check(&graph, &registry, &drived_put, &drived2_put));
    assert!(!check(&graph, &registry, &drived2_put, &drived_put));
}

#[test]
fn test_overrides_errors() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let base_get_a = member(&graph, "Base", "getA", &[]);

    let missing = TypeKey(9_999);
    let ghost = MemberSignature::new(missing, base_get_a.name, NO_PARAMS);
    assert_eq!(
        resolver.overrides(&base_get_a, &ghost),
        Err(ResolveError::UnknownType(missing))
    );

    // A base parameter naming a slot its declaring type does not own.
    let base = ty(&graph, "Base");
    let map = ty(&graph, "Map");
    let base_put = member(&graph, "Base", "put", &["A", "Integer"]);
    let mut malformed = base_put.clone();
    malformed.params[0] = TypeArg::slot(map, 0);
    let drived_put = member(&graph, "Drived", "put", &["Number", "Integer"]);
    assert_eq!(
        resolver.overrides(&malformed, &drived_put),
        Err(ResolveError::UnknownSlot {
            ty: base,
            slot: SlotRef::new(map, 0),
        })
    );
}

#[test]
fn test_overrides_pairs_query_events() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let map_put = member(&graph, "Map", "put", &["K", "V"]);
    let drived2_put = member(&graph, "Drived2", "put", &["Double", "Integer"]);
    let missing = TypeKey(9_999);
    let ghost = MemberSignature::new(missing, map_put.name, NO_PARAMS);

    let events = capture_query_events(|| {
        assert_eq!(resolver.overrides(&map_put, &drived2_put), Ok(true));
        assert!(resolver.overrides(&map_put, &ghost).is_ok());
        assert!(resolver.overrides(&ghost, &map_put).is_ok());
        let ghost_params = MemberSignature::new(missing, map_put.name, map_put.params.clone());
        assert_eq!(
            resolver.overrides(&map_put, &ghost_params),
            Err(ResolveError::UnknownType(missing))
        );
    });
    let relation = |phase: &str| -> Vec<serde_json::Value> {
        events
            .iter()
            .filter(|fields| fields["op"] == "overrides" && fields["phase"] == phase)
            .cloned()
            .collect()
    };
    let starts = relation("start");
    let ends = relation("end");

    assert_eq!(starts.len(), 4, "{events:?}");
    assert_eq!(ends.len(), 4, "{events:?}");
    for (start, end) in starts.iter().zip(&ends) {
        assert_eq!(start["query_id"], end["query_id"]);
    }
    assert_eq!(ends[0]["ok"], true);
    assert_eq!(ends[0]["result"], true);
    assert_eq!(ends[3]["ok"], false);
    assert_eq!(ends[3]["result"], false);
}

#[test]
fn test_find_base_members() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let names = |members: Vec<MemberSignature>| -> Vec<String> {
        members.iter().map(|m| graph.display_member(m)).collect()
    };

    let drived2_put = member(&graph, "Drived2", "put", &["Double", "Integer"]);
    assert_eq!(
        names(resolver.find_base_members(&drived2_put).expect("resolves")),
        [
            "Base.put(A, Integer)",
            "HashMap.put(K, V)",
            "AbstractMap.put(K, V)",
            "Map.put(K, V)",
        ]
    );

    let drived_put = member(&graph, "Drived", "put", &["Object", "Object"]);
    assert_eq!(
        names(resolver.find_base_members(&drived_put).expect("resolves")),
        ["HashMap.put(K, V)", "AbstractMap.put(K, V)", "Map.put(K, V)"]
    );

    let drived_get_v = member(&graph, "Drived", "getV", &["int", "Object"]);
    assert!(
        resolver
            .find_base_members(&drived_get_v)
            .expect("resolves")
            .is_empty()
    );
}

#[test]
fn test_find_required_and_declared_members() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let named = |name: &'static str| {
        let graph = graph.clone();
        move |m: &MemberSignature| graph.resolve_atom(m.name) == name
    };
    let drived = ty(&graph, "Drived");
    let drived2 = ty(&graph, "Drived2");

    let own = resolver
        .find_required_member(drived, named("getV"))
        .expect("resolves")
        .expect("found");
    assert_eq!(graph.display_member(&own), "Drived.getV(Object, Number)");

    let inherited = resolver
        .find_required_member(drived2, named("getV"))
        .expect("resolves")
        .expect("found");
    assert_eq!(graph.display_member(&inherited), "Base.getV(K, A)");

    let from_interface = resolver
        .find_required_member(drived2, named("get"))
        .expect("resolves")
        .expect("found");
    assert_eq!(graph.display_member(&from_interface), "Map.get(Object)");

    assert_eq!(resolver.find_required_member(drived2, named("remove")), Ok(None));
    assert_eq!(resolver.find_declared_member(drived2, named("getV")), Ok(None));
    assert!(
        resolver
            .find_declared_member(drived2, named("put"))
            .expect("resolves")
            .is_some()
    );
}

#[test]
fn test_find_fields() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let drived = ty(&graph, "Drived");
    let base = ty(&graph, "Base");
    let named = |name: &'static str| {
        let graph = graph.clone();
        move |f: &FieldDecl| graph.resolve_atom(f.name) == name
    };

    let size = resolver
        .find_required_field(drived, named("size"))
        .expect("resolves")
        .expect("found");
    assert_eq!(size.declaring_type, ty(&graph, "HashMap"));
    assert_eq!(size.ty, TypeArg::Concrete(ty(&graph, "int")));

    let last = resolver
        .find_declared_field(base, named("last"))
        .expect("resolves")
        .expect("found");
    assert_eq!(last.ty, TypeArg::slot(base, 2));

    assert_eq!(resolver.find_declared_field(drived, named("last")), Ok(None));
    assert_eq!(resolver.find_required_field(drived, named("missing")), Ok(None));
}

#[test]
fn test_find_required_interface() {
    let graph = sample_graph();
    let registry = registry_for(&graph);
    let resolver = OverrideResolver::new(&registry);
    let map = ty(&graph, "Map");

    assert_eq!(
        resolver.find_required_interface(ty(&graph, "Drived"), |_| true),
        Ok(Some(map))
    );
    assert_eq!(resolver.find_required_interface(map, |_| true), Ok(Some(map)));
    assert_eq!(
        resolver.find_required_interface(graph.object(), |_| true),
        Ok(None)
    );
    assert_eq!(
        resolver.find_required_interface(ty(&graph, "Drived2"), |d| d.arity() == 3),
        Ok(None)
    );
}
