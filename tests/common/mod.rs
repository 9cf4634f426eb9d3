#![allow(dead_code)]

use chatloom::event_bus::EventChannel;
use chatloom::graph::{Component, GraphStore};
use chatloom::types::{ComponentId, EdgeId, MessageId, NodeId, UiToolType};
use serde_json::json;

/// Adds a node with a question component and a materialized message.
pub fn add_step(store: &mut GraphStore, node: &str, message: &str) {
    add_step_with_tool(store, node, message, UiToolType::Question);
}

pub fn add_step_with_tool(store: &mut GraphStore, node: &str, message: &str, tool: UiToolType) {
    let node_id = NodeId::from(node);
    store.add_node(node_id.clone()).unwrap();
    store
        .attach_component(
            &node_id,
            Component {
                id: ComponentId::from(format!("c-{node}")),
                tool,
                content: json!({}),
            },
        )
        .unwrap();
    store
        .materialize_message(&node_id, MessageId::from(message), false)
        .unwrap();
}

/// Adds a node without materializing any message.
pub fn add_bare_node(store: &mut GraphStore, node: &str) {
    store.add_node(NodeId::from(node)).unwrap();
}

pub fn connect(store: &mut GraphStore, edge: &str, from: &str, to: &str) {
    store
        .connect(EdgeId::from(edge), &NodeId::from(from), &NodeId::from(to))
        .unwrap();
}

/// A linear chain n1 -> n2 -> ... -> nN with messages m1..mN.
pub fn linear_store(n: usize) -> GraphStore {
    let mut store = GraphStore::new(EventChannel::new());
    for i in 1..=n {
        add_step(&mut store, &format!("n{i}"), &format!("m{i}"));
    }
    for i in 1..n {
        connect(&mut store, &format!("e{i}"), &format!("n{i}"), &format!("n{}", i + 1));
    }
    store
}

pub fn ids(raw: &[&str]) -> Vec<MessageId> {
    raw.iter().map(|s| MessageId::from(*s)).collect()
}
