use chatloom::event_bus::EventChannel;
use chatloom::graph::{GraphStore, resolve};
use chatloom::types::MessageId;

mod common;
use common::*;

#[test]
fn linear_chain_resolves_in_edge_order() {
    let store = linear_store(3);
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1", "m2", "m3"]));
    assert!(resolved.orphans.is_empty());
}

#[test]
fn isolated_node_appends_as_orphan() {
    let mut store = linear_store(3);
    add_step(&mut store, "n4", "m4");
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1", "m2", "m3", "m4"]));
    assert_eq!(resolved.orphans, ids(&["m4"]));
    assert!(resolved.is_orphan(&MessageId::from("m4")));
    assert!(!resolved.is_orphan(&MessageId::from("m1")));
}

#[test]
fn two_node_cycle_resolves_each_exactly_once() {
    let mut store = GraphStore::new(EventChannel::new());
    add_step(&mut store, "n1", "m1");
    add_step(&mut store, "n2", "m2");
    connect(&mut store, "e1", "n1", "n2");
    connect(&mut store, "e2", "n2", "n1");
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1", "m2"]));
    assert!(resolved.orphans.is_empty());
}

#[test]
fn self_loop_terminates() {
    let mut store = GraphStore::new(EventChannel::new());
    add_step(&mut store, "n1", "m1");
    connect(&mut store, "e1", "n1", "n1");
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1"]));
    // A self-loop is an edge, so the node is connected, not an orphan.
    assert!(resolved.orphans.is_empty());
}

#[test]
fn branch_explores_first_edge_first() {
    let mut store = GraphStore::new(EventChannel::new());
    for (n, m) in [("n1", "m1"), ("n2", "m2"), ("n3", "m3")] {
        add_step(&mut store, n, m);
    }
    connect(&mut store, "e1", "n1", "n2");
    connect(&mut store, "e2", "n1", "n3");
    assert_eq!(resolve(&store).order, ids(&["m1", "m2", "m3"]));
}

#[test]
fn diamond_merge_emits_join_once() {
    let mut store = GraphStore::new(EventChannel::new());
    for (n, m) in [("n1", "m1"), ("n2", "m2"), ("n3", "m3"), ("n4", "m4")] {
        add_step(&mut store, n, m);
    }
    connect(&mut store, "e1", "n1", "n2");
    connect(&mut store, "e2", "n1", "n3");
    connect(&mut store, "e3", "n2", "n4");
    connect(&mut store, "e4", "n3", "n4");
    // Depth-first: the join point is reached through the first branch.
    assert_eq!(resolve(&store).order, ids(&["m1", "m2", "m4", "m3"]));
}

#[test]
fn unmaterialized_nodes_are_skipped_not_errors() {
    let mut store = GraphStore::new(EventChannel::new());
    add_step(&mut store, "n1", "m1");
    add_bare_node(&mut store, "n2");
    add_step(&mut store, "n3", "m3");
    connect(&mut store, "e1", "n1", "n2");
    connect(&mut store, "e2", "n2", "n3");
    assert_eq!(resolve(&store).order, ids(&["m1", "m3"]));
}

#[test]
fn disconnected_fragments_follow_insertion_order() {
    let mut store = GraphStore::new(EventChannel::new());
    for (n, m) in [("a1", "x1"), ("a2", "x2"), ("b1", "y1"), ("b2", "y2")] {
        add_step(&mut store, n, m);
    }
    connect(&mut store, "e1", "a1", "a2");
    connect(&mut store, "e2", "b1", "b2");
    assert_eq!(resolve(&store).order, ids(&["x1", "x2", "y1", "y2"]));
}

#[test]
fn orphans_trail_connected_nodes_regardless_of_insertion() {
    let mut store = GraphStore::new(EventChannel::new());
    add_step(&mut store, "lone", "m0");
    add_step(&mut store, "n1", "m1");
    add_step(&mut store, "n2", "m2");
    connect(&mut store, "e1", "n1", "n2");
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1", "m2", "m0"]));
    assert_eq!(resolved.orphans, ids(&["m0"]));
}

#[test]
fn resolution_is_reproducible() {
    let mut store = linear_store(5);
    add_step(&mut store, "n9", "m9");
    connect(&mut store, "loop", "n5", "n1");
    let first = resolve(&store);
    let second = resolve(&store);
    assert_eq!(first, second);
}

#[test]
fn empty_store_resolves_empty() {
    let store = GraphStore::new(EventChannel::new());
    let resolved = resolve(&store);
    assert!(resolved.is_empty());
    assert_eq!(resolved.len(), 0);
}

#[test]
fn removing_an_edge_reflows_to_orphans() {
    let mut store = linear_store(2);
    store.disconnect(&chatloom::types::EdgeId::from("e1")).unwrap();
    let resolved = resolve(&store);
    assert_eq!(resolved.order, ids(&["m1", "m2"]));
    assert_eq!(resolved.orphans, ids(&["m1", "m2"]));
}
