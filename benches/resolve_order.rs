use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use chatloom::event_bus::EventChannel;
use chatloom::graph::{Component, GraphStore, resolve};
use chatloom::types::{ComponentId, EdgeId, MessageId, NodeId, UiToolType};

fn chain(len: usize) -> GraphStore {
    let mut store = GraphStore::new(EventChannel::new());
    for i in 0..len {
        let node_id = NodeId::from(format!("n{i}"));
        store.add_node(node_id.clone()).unwrap();
        store
            .attach_component(
                &node_id,
                Component {
                    id: ComponentId::from(format!("c{i}")),
                    tool: UiToolType::Question,
                    content: serde_json::json!({}),
                },
            )
            .unwrap();
        store
            .materialize_message(&node_id, MessageId::from(format!("m{i}")), false)
            .unwrap();
    }
    for i in 1..len {
        store
            .connect(
                EdgeId::from(format!("e{i}")),
                &NodeId::from(format!("n{}", i - 1)),
                &NodeId::from(format!("n{i}")),
            )
            .unwrap();
    }
    store
}

fn fan(width: usize) -> GraphStore {
    let mut store = chain(1);
    for i in 0..width {
        let node_id = NodeId::from(format!("leaf{i}"));
        store.add_node(node_id.clone()).unwrap();
        store
            .attach_component(
                &node_id,
                Component {
                    id: ComponentId::from(format!("cl{i}")),
                    tool: UiToolType::Message,
                    content: serde_json::json!({}),
                },
            )
            .unwrap();
        store
            .materialize_message(&node_id, MessageId::from(format!("ml{i}")), false)
            .unwrap();
        store
            .connect(EdgeId::from(format!("el{i}")), &NodeId::from("n0"), &node_id)
            .unwrap();
    }
    store
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_order");
    for size in [100usize, 1_000, 10_000] {
        let store = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &store, |b, s| {
            b.iter(|| black_box(resolve(s)))
        });
    }
    for width in [100usize, 1_000] {
        let store = fan(width);
        group.bench_with_input(BenchmarkId::new("fan", width), &store, |b, s| {
            b.iter(|| black_box(resolve(s)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
