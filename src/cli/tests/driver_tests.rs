use super::args::{Command, MemberSpec};
use super::driver::{AncestorEntry, MappingView, Report, Session};
use super::hierarchy::parse_hierarchy;
use genmap_solver::RegistryConfig;
use std::sync::Arc;

const COLLECTIONS: &str = include_str!("../../../demos/collections.json");

fn session() -> Session {
    let graph = parse_hierarchy(COLLECTIONS).expect("demo hierarchy parses");
    Session::new(Arc::new(graph), RegistryConfig::default())
}

fn member(spec: &str) -> MemberSpec {
    spec.parse().expect("valid member spec")
}

fn entry(ancestor: &str, params: &[&str]) -> AncestorEntry {
    AncestorEntry {
        ancestor: ancestor.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
    }
}

#[test]
fn ancestors_report() {
    let report = session()
        .run(&Command::Ancestors {
            ty: "Base".to_string(),
        })
        .expect("resolves");

    let Report::Ancestors {
        supertypes,
        interfaces,
        mappings,
        ..
    } = &report
    else {
        panic!("unexpected report: {report:?}");
    };
    assert_eq!(supertypes, &["HashMap", "AbstractMap", "Object"]);
    assert_eq!(interfaces, &["Map"]);
    assert_eq!(mappings[0], entry("Base", &["K", "V", "A"]));
    assert!(mappings.contains(&entry("HashMap", &["A", "Integer"])));
    assert!(mappings.contains(&entry("Map", &["A", "Integer"])));
    assert!(mappings.contains(&entry("Object", &[])));

    let text = report.to_string();
    assert!(text.starts_with("Base\n"));
    assert!(text.contains("  supertypes: HashMap, AbstractMap, Object\n"));
    assert!(text.contains("    Map<A, Integer>\n"));
}

#[test]
fn mapping_report() {
    let session = session();

    let concrete = session
        .run(&Command::Mapping {
            ty: "Drived$1".to_string(),
            ancestor: "Base".to_string(),
            index: 2,
        })
        .expect("resolves");
    assert_eq!(
        concrete,
        Report::Mapping {
            ty: "Drived$1".to_string(),
            ancestor: "Base".to_string(),
            index: 2,
            resolved: MappingView::Concrete {
                name: "Number".to_string(),
            },
        }
    );
    assert_eq!(concrete.to_string(), "Base[2] from Drived$1 = Number\n");

    let derived = session
        .run(&Command::Mapping {
            ty: "Base".to_string(),
            ancestor: "Map".to_string(),
            index: 0,
        })
        .expect("resolves");
    assert_eq!(derived.to_string(), "Map[0] from Base = A (parameter 2)\n");
    let json = serde_json::to_value(&derived).expect("serializes");
    assert_eq!(json["command"], "mapping");
    assert_eq!(json["type"], "Base");
    assert_eq!(json["resolved"]["kind"], "derived_index");
    assert_eq!(json["resolved"]["index"], 2);
}

#[test]
fn mapping_errors_carry_context() {
    let session = session();

    let err = session
        .run(&Command::Mapping {
            ty: "Base".to_string(),
            ancestor: "Drived".to_string(),
            index: 0,
        })
        .expect_err("Drived is not an ancestor of Base");
    let message = format!("{err:#}");
    assert!(message.contains("failed to map Drived[0] from 'Base'"), "{message}");

    let err = session
        .run(&Command::Ancestors {
            ty: "Nope".to_string(),
        })
        .expect_err("unknown type");
    assert!(err.to_string().contains("unknown type 'Nope'"));
}

#[test]
fn overrides_report() {
    let session = session();

    let report = session
        .run(&Command::Overrides {
            base: member("Map.put(K,V)"),
            derived: member("Drived2.put(Double,Integer)"),
        })
        .expect("resolves");
    assert_eq!(
        report,
        Report::Overrides {
            base: "Map.put(K, V)".to_string(),
            derived: "Drived2.put(Double, Integer)".to_string(),
            overrides: true,
        }
    );
    assert_eq!(
        report.to_string(),
        "Drived2.put(Double, Integer) overrides Map.put(K, V)\n"
    );

    let report = session
        .run(&Command::Overrides {
            base: member("Base.put(A,Integer)"),
            derived: member("Drived.put(Object,Object)"),
        })
        .expect("resolves");
    assert!(matches!(report, Report::Overrides { overrides: false, .. }));

    let err = session
        .run(&Command::Overrides {
            base: member("Map.put(K,K)"),
            derived: member("Drived2.put(Double,Integer)"),
        })
        .expect_err("no such member");
    assert!(err.to_string().contains("declares no member Map.put(K, K)"));
}

#[test]
fn base_members_report() {
    let report = session()
        .run(&Command::BaseMembers {
            member: member("Drived2.put(Double,Integer)"),
        })
        .expect("resolves");
    assert_eq!(
        report,
        Report::BaseMembers {
            member: "Drived2.put(Double, Integer)".to_string(),
            base_members: vec![
                "Base.put(A, Integer)".to_string(),
                "HashMap.put(K, V)".to_string(),
                "AbstractMap.put(K, V)".to_string(),
                "Map.put(K, V)".to_string(),
            ],
        }
    );

    let report = session()
        .run(&Command::BaseMembers {
            member: member("Drived.getV(int,Object)"),
        })
        .expect("resolves");
    assert_eq!(
        report.to_string(),
        "Drived.getV(int, Object) overrides nothing\n"
    );
}

#[test]
fn depth_limit_is_reported() {
    let graph = parse_hierarchy(COLLECTIONS).expect("demo hierarchy parses");
    let session = Session::new(
        Arc::new(graph),
        RegistryConfig {
            max_depth: 2,
            ..RegistryConfig::default()
        },
    );
    let err = session
        .run(&Command::Ancestors {
            ty: "Drived$1".to_string(),
        })
        .expect_err("hierarchy is deeper than two levels");
    assert!(format!("{err:#}").contains("deeper than 2 levels"));
}
