use proptest::prelude::*;

use chatloom::event_bus::EventChannel;
use chatloom::graph::{Component, GraphStore, resolve};
use chatloom::types::{ComponentId, EdgeId, MessageId, NodeId, UiToolType};
use serde_json::json;
use std::collections::HashSet;

const MAX_NODES: usize = 16;

/// Builds a store with `node_count` nodes, materializing message `m{i}` for
/// every index where `materialized` says so, and adding every in-range edge.
fn build_store(
    node_count: usize,
    edges: &[(usize, usize)],
    materialized: &[bool],
) -> GraphStore {
    let mut store = GraphStore::new(EventChannel::new());
    for i in 0..node_count {
        let node_id = NodeId::from(format!("n{i}"));
        store.add_node(node_id.clone()).unwrap();
        if materialized.get(i).copied().unwrap_or(false) {
            store
                .attach_component(
                    &node_id,
                    Component {
                        id: ComponentId::from(format!("c{i}")),
                        tool: UiToolType::Question,
                        content: json!({}),
                    },
                )
                .unwrap();
            store
                .materialize_message(&node_id, MessageId::from(format!("m{i}")), false)
                .unwrap();
        }
    }
    for (k, (from, to)) in edges.iter().enumerate() {
        if *from < node_count && *to < node_count {
            store
                .connect(
                    EdgeId::from(format!("e{k}")),
                    &NodeId::from(format!("n{from}")),
                    &NodeId::from(format!("n{to}")),
                )
                .unwrap();
        }
    }
    store
}

fn incident_nodes(node_count: usize, edges: &[(usize, usize)]) -> HashSet<usize> {
    let mut incident = HashSet::new();
    for (from, to) in edges {
        if *from < node_count && *to < node_count {
            incident.insert(*from);
            incident.insert(*to);
        }
    }
    incident
}

proptest! {
    /// The order is a permutation of exactly the materialized message ids,
    /// for any topology including cycles and disconnected fragments.
    #[test]
    fn order_is_a_permutation_of_materialized_ids(
        node_count in 0usize..MAX_NODES,
        edges in prop::collection::vec((0usize..MAX_NODES, 0usize..MAX_NODES), 0..48),
        materialized in prop::collection::vec(any::<bool>(), MAX_NODES),
    ) {
        let store = build_store(node_count, &edges, &materialized);
        let resolved = resolve(&store);

        let mut expected: Vec<MessageId> = (0..node_count)
            .filter(|i| materialized[*i])
            .map(|i| MessageId::from(format!("m{i}")))
            .collect();
        let mut actual = resolved.order.clone();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    /// Orphans are exactly the materialized zero-edge nodes, they close the
    /// order, and they keep insertion order among themselves.
    #[test]
    fn orphans_form_the_ordered_tail(
        node_count in 0usize..MAX_NODES,
        edges in prop::collection::vec((0usize..MAX_NODES, 0usize..MAX_NODES), 0..48),
        materialized in prop::collection::vec(any::<bool>(), MAX_NODES),
    ) {
        let store = build_store(node_count, &edges, &materialized);
        let resolved = resolve(&store);

        let incident = incident_nodes(node_count, &edges);
        let expected_orphans: Vec<MessageId> = (0..node_count)
            .filter(|i| materialized[*i] && !incident.contains(i))
            .map(|i| MessageId::from(format!("m{i}")))
            .collect();

        prop_assert_eq!(&resolved.orphans, &expected_orphans);
        let tail_start = resolved.order.len() - resolved.orphans.len();
        prop_assert_eq!(&resolved.order[tail_start..], resolved.orphans.as_slice());
    }

    /// Resolution is a pure function: two passes over the same store agree.
    #[test]
    fn resolution_is_deterministic(
        node_count in 0usize..MAX_NODES,
        edges in prop::collection::vec((0usize..MAX_NODES, 0usize..MAX_NODES), 0..48),
        materialized in prop::collection::vec(any::<bool>(), MAX_NODES),
    ) {
        let store = build_store(node_count, &edges, &materialized);
        prop_assert_eq!(resolve(&store), resolve(&store));
    }
}
