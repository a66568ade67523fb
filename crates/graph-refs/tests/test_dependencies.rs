use std::collections::HashSet;

use graph_refs::{
    ContextRef, FieldDecl, Marker, MarkerType, Ref, Referable, TypeExpr, TypeKey, dependencies,
    dependencies_of, literal_name,
};

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Network {
    cidr: String,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Subnet {
    network: Ref<Network>,
    cidr: String,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Gateway {
    name: String,
}

literal_name!(Region = "region");

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Instance {
    subnet: Ref<Subnet>,
    gateway: Ref<Gateway>,
    region: ContextRef<Region>,
    name: String,
}

fn keys<const N: usize>(expected: [TypeKey; N]) -> HashSet<TypeKey> {
    expected.into_iter().collect()
}

#[test]
fn direct_mode_collects_each_target_once() {
    let deps = dependencies_of::<Instance>(false);
    assert_eq!(
        deps,
        keys([TypeKey::of::<Subnet>(), TypeKey::of::<Gateway>()])
    );
}

#[test]
fn context_references_never_contribute() {
    let deps = dependencies_of::<Instance>(true);
    assert!(!deps.contains(&TypeKey::unit()));
}

#[test]
fn transitive_mode_follows_chains() {
    assert_eq!(
        dependencies_of::<Instance>(false),
        keys([TypeKey::of::<Subnet>(), TypeKey::of::<Gateway>()])
    );
    assert_eq!(
        dependencies_of::<Instance>(true),
        keys([
            TypeKey::of::<Subnet>(),
            TypeKey::of::<Gateway>(),
            TypeKey::of::<Network>(),
        ])
    );
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct DiamondTip {
    left: Ref<DiamondLeft>,
    right: Ref<DiamondRight>,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct DiamondLeft {
    shared: Ref<DiamondBase>,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct DiamondRight {
    shared: Ref<DiamondBase>,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct DiamondBase {
    name: String,
}

#[test]
fn diamond_graphs_deduplicate_the_shared_node() {
    let deps = dependencies_of::<DiamondTip>(true);
    assert_eq!(
        deps,
        keys([
            TypeKey::of::<DiamondLeft>(),
            TypeKey::of::<DiamondRight>(),
            TypeKey::of::<DiamondBase>(),
        ])
    );
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct TreeNode {
    parent: Option<Ref<TreeNode>>,
    value: i64,
}

#[test]
fn self_referential_types_terminate() {
    assert_eq!(
        dependencies_of::<TreeNode>(true),
        keys([TypeKey::of::<TreeNode>()])
    );
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Ping {
    other: Ref<Pong>,
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct Pong {
    other: Ref<Ping>,
}

#[test]
fn mutual_cycles_expand_each_node_once() {
    assert_eq!(
        dependencies_of::<Ping>(true),
        keys([TypeKey::of::<Ping>(), TypeKey::of::<Pong>()])
    );
}

struct Mixed;

impl Referable for Mixed {
    fn own_fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::new(
                "blob",
                TypeExpr::Marker(Marker::reference(TypeKey::opaque::<String>())),
            ),
            FieldDecl::new("subnet", Ref::<Subnet>::type_expr()),
        ]
    }
}

#[test]
fn non_introspectable_nodes_do_not_abort_the_walk() {
    let deps = dependencies_of::<Mixed>(true);
    assert_eq!(
        deps,
        keys([
            TypeKey::opaque::<String>(),
            TypeKey::of::<Subnet>(),
            TypeKey::of::<Network>(),
        ])
    );
}

struct SentinelRef;

impl Referable for SentinelRef {
    fn own_fields() -> Vec<FieldDecl> {
        vec![FieldDecl::new(
            "nothing",
            TypeExpr::Marker(Marker::reference(TypeKey::unit())),
        )]
    }
}

#[test]
fn the_unit_sentinel_is_discarded_defensively() {
    assert!(dependencies_of::<SentinelRef>(false).is_empty());
}

#[test]
fn dependencies_on_an_opaque_key_are_empty() {
    assert!(dependencies(TypeKey::opaque::<u64>(), true).is_empty());
}

#[allow(dead_code)]
#[derive(graph_refs::Referable)]
struct DoubleRef {
    primary: Ref<Network>,
    secondary: Ref<Network>,
}

#[test]
fn repeated_targets_collapse_in_the_set() {
    assert_eq!(
        dependencies_of::<DoubleRef>(false),
        keys([TypeKey::of::<Network>()])
    );
}
