//! Smoke tests for the generic graph.

use super::TestEdge;
use crate::adjacency::EdgeFilter;
use crate::graph::{DefaultEdgeKind, Graph};
use crate::Error;

type TestGraph = Graph<&'static str, TestEdge>;

#[test]
fn test_node_payload_operations() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");

    assert!(graph.has_node(a));
    assert_eq!(graph.get_node(a), Some(&"a"));

    graph.update_node(a, "a2").unwrap();
    assert_eq!(graph.get_node(a), Some(&"a2"));

    *graph.get_node_mut(a).unwrap() = "a3";
    assert_eq!(graph.get_node(a), Some(&"a3"));
}

#[test]
fn test_update_missing_node_fails() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    graph.remove_node(a).unwrap();

    assert!(matches!(
        graph.update_node(a, "x"),
        Err(Error::UnknownNode(_))
    ));
}

#[test]
fn test_bidirectional_consistency() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    graph.add_edge(a, b, TestEdge::Sync).unwrap();

    assert!(graph.has_edge(a, b, TestEdge::Sync));
    assert!(graph
        .get_node_ids_connected_from(a, &EdgeFilter::One(TestEdge::Sync))
        .contains(&b));
    assert!(graph
        .get_node_ids_connected_to(b, &EdgeFilter::One(TestEdge::Sync))
        .contains(&a));
}

#[test]
fn test_neighbour_queries_deduplicate() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(a, b, TestEdge::Lazy).unwrap();

    assert_eq!(
        graph.get_node_ids_connected_from(a, &EdgeFilter::All),
        vec![b]
    );
    assert_eq!(
        graph.get_node_ids_connected_from(
            a,
            &EdgeFilter::Any(vec![TestEdge::Sync, TestEdge::Lazy])
        ),
        vec![b]
    );
}

#[test]
fn test_remove_node_cascades_edges() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(b, c, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Lazy).unwrap();

    graph.remove_node(b).unwrap();

    assert!(!graph.has_node(b));
    assert!(graph
        .get_all_edges()
        .all(|edge| edge.from != b && edge.to != b));
    // c is still held by the lazy edge from the root.
    assert!(graph.has_node(c));
}

#[test]
fn test_orphan_pruning_cascade() {
    // Chain a -> b -> c rooted at a: removing the first edge must take the
    // whole chain down.
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(b, c, TestEdge::Sync).unwrap();

    graph.remove_edge(a, b, TestEdge::Sync, true).unwrap();

    assert!(graph.has_node(a));
    assert!(!graph.has_node(b));
    assert!(!graph.has_node(c));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_orphan_pruning_spares_reachable_nodes() {
    // Diamond: a -> b -> d and a -> c -> d. Cutting b keeps d alive.
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    let d = graph.add_node("d");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Sync).unwrap();
    graph.add_edge(b, d, TestEdge::Sync).unwrap();
    graph.add_edge(c, d, TestEdge::Sync).unwrap();

    graph.remove_edge(a, b, TestEdge::Sync, true).unwrap();

    assert!(!graph.has_node(b));
    assert!(graph.has_node(d));
    assert!(graph.has_edge(c, d, TestEdge::Sync));
}

#[test]
fn test_orphan_cycle_detached_from_root_is_pruned() {
    // a -> b <-> c: the b/c cycle keeps inbound edges on both members, but
    // cutting a -> b leaves no path from the root.
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(b, c, TestEdge::Sync).unwrap();
    graph.add_edge(c, b, TestEdge::Sync).unwrap();

    graph.remove_edge(a, b, TestEdge::Sync, true).unwrap();

    assert!(!graph.has_node(b));
    assert!(!graph.has_node(c));
}

#[test]
fn test_is_orphaned_without_root_uses_inbound_edges() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    graph.add_edge(a, b, TestEdge::Sync).unwrap();

    assert!(graph.is_orphaned_node(a));
    assert!(!graph.is_orphaned_node(b));
}

#[test]
fn test_remove_edge_without_pruning_keeps_orphan() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();

    graph.remove_edge(a, b, TestEdge::Sync, false).unwrap();
    assert!(graph.has_node(b));
    assert!(graph.is_orphaned_node(b));
}

#[test]
fn test_remove_edges_by_type() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Lazy).unwrap();

    graph.remove_edges(a, TestEdge::Sync).unwrap();

    assert!(!graph.has_node(b));
    assert!(graph.has_node(c));
    assert!(graph.has_edge(a, c, TestEdge::Lazy));
}

#[test]
fn test_replace_node_ids_connected_to() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    let d = graph.add_node("d");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Sync).unwrap();

    graph
        .replace_node_ids_connected_to(a, &[c, d], None, TestEdge::Sync)
        .unwrap();

    let mut neighbours = graph.get_node_ids_connected_from(a, &EdgeFilter::One(TestEdge::Sync));
    neighbours.sort();
    assert_eq!(neighbours, vec![c, d]);
    // b lost its only path from the root.
    assert!(!graph.has_node(b));
}

#[test]
fn test_replace_node_ids_connected_to_respects_filter() {
    let mut graph: TestGraph = Graph::new();
    let a = graph.add_node("a");
    let b = graph.add_node("b");
    let c = graph.add_node("c");
    let d = graph.add_node("d");
    graph.set_root_node_id(a);
    graph.add_edge(a, b, TestEdge::Sync).unwrap();
    graph.add_edge(a, c, TestEdge::Sync).unwrap();

    // Only b may be replaced; c is outside the filter and must survive.
    let keep_b_only = |id| id == b;
    graph
        .replace_node_ids_connected_to(a, &[d], Some(&keep_b_only), TestEdge::Sync)
        .unwrap();

    let mut neighbours = graph.get_node_ids_connected_from(a, &EdgeFilter::One(TestEdge::Sync));
    neighbours.sort();
    assert_eq!(neighbours, vec![c, d]);
}

#[test]
fn test_default_edge_kind_graph() {
    let mut graph: Graph<u32> = Graph::new();
    let a = graph.add_node(1);
    let b = graph.add_node(2);
    graph.add_edge(a, b, DefaultEdgeKind).unwrap();
    assert!(graph.has_edge(a, b, DefaultEdgeKind));
    assert_eq!(graph.edge_count(), 1);
}
