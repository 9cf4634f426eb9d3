/*!
Persistence primitives for serializing/deserializing the flow graph and its
projected transcript (used by the auto-saver and any host-provided storage
backend).

Design goals:
- Explicit serde-friendly structs decoupled from the in-memory
  representations.
- Conversion logic localized (From impls) so storage code stays lean and
  declarative.
- A hard version gate: a snapshot from a different format version loads as
  "no state", never as a half-understood graph. Migration is a known gap,
  deliberately out of scope.

This module intentionally does NOT perform I/O beyond the [`SnapshotStore`]
boundary trait. It is pure data transformation and (de)serialization glue.
*/

use async_trait::async_trait;
use chrono::Utc;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use miette::Diagnostic;
use thiserror::Error;

use crate::event_bus::EventChannel;
use crate::graph::{Component, Edge, GraphStore, Node};
use crate::projector::{ConversationProjector, Message};
use crate::types::{ComponentId, EdgeId, MessageId, NodeId};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted shape of a graph node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNode {
    pub id: NodeId,
    #[serde(default)]
    pub outgoing_edge_ids: Vec<EdgeId>,
    #[serde(default)]
    pub incoming_edge_ids: Vec<EdgeId>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub component_id: Option<ComponentId>,
}

impl From<&Node> for PersistedNode {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            outgoing_edge_ids: n.outgoing.clone(),
            incoming_edge_ids: n.incoming.clone(),
            message_id: n.message_id.clone(),
            component_id: n.component_id.clone(),
        }
    }
}

impl From<PersistedNode> for Node {
    fn from(p: PersistedNode) -> Self {
        Self {
            id: p.id,
            outgoing: p.outgoing_edge_ids,
            incoming: p.incoming_edge_ids,
            message_id: p.message_id,
            component_id: p.component_id,
        }
    }
}

/// Persisted shape of a graph edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEdge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
}

impl From<&Edge> for PersistedEdge {
    fn from(e: &Edge) -> Self {
        Self {
            id: e.id.clone(),
            source_node_id: e.source.clone(),
            target_node_id: e.target.clone(),
        }
    }
}

impl From<PersistedEdge> for Edge {
    fn from(p: PersistedEdge) -> Self {
        Self {
            id: p.id,
            source: p.source_node_id,
            target: p.target_node_id,
        }
    }
}

/// Complete persisted shape of the engine's state.
///
/// `nodes` is ordered: its sequence is the store's insertion order, which the
/// resolver depends on for deterministic tie-breaks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub version: u32,
    /// RFC3339 string form of save time (keeps `chrono::DateTime` out of the
    /// serialized shape).
    pub last_saved: String,
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    pub components: FxHashMap<ComponentId, Component>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub orphan_message_ids: Vec<MessageId>,
}

/// Conversion and storage errors for the snapshot layer.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("JSON serialization/deserialization failed: {source}")]
    #[diagnostic(
        code(chatloom::snapshot::serde),
        help("Ensure the JSON structure matches the FlowSnapshot shape.")
    )]
    Serde {
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot version {found} does not match supported version {expected}")]
    #[diagnostic(
        code(chatloom::snapshot::version_mismatch),
        help("Snapshot migration is out of scope; the caller falls back to an empty graph.")
    )]
    VersionMismatch { found: u32, expected: u32 },

    #[error("snapshot storage failed: {0}")]
    #[diagnostic(code(chatloom::snapshot::storage))]
    Storage(String),
}

impl FlowSnapshot {
    /// Captures the current store and transcript into a persistable shape.
    ///
    /// Orphan ids come from a fresh resolution pass so they are recorded in
    /// deterministic insertion order, not in set-iteration order.
    #[must_use]
    pub fn capture(store: &GraphStore, projector: &ConversationProjector) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            last_saved: Utc::now().to_rfc3339(),
            nodes: store.nodes().map(PersistedNode::from).collect(),
            edges: store.edges().map(PersistedEdge::from).collect(),
            components: store
                .components()
                .map(|c| (c.id.clone(), c.clone()))
                .collect(),
            messages: projector.messages().to_vec(),
            orphan_message_ids: store.resolve().orphans,
        }
    }

    /// Reconstructs the graph store and projector behind this snapshot,
    /// wired to `channel`. Nothing is published during reconstruction; call
    /// [`GraphStore::sync`] afterwards if subscribers need the first order.
    #[must_use]
    pub fn restore(self, channel: &EventChannel) -> (GraphStore, ConversationProjector) {
        let node_order: Vec<NodeId> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let nodes: FxHashMap<NodeId, Node> = self
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), Node::from(n)))
            .collect();
        let edges: FxHashMap<EdgeId, Edge> = self
            .edges
            .into_iter()
            .map(|e| (e.id.clone(), Edge::from(e)))
            .collect();
        let store = GraphStore::from_parts(nodes, node_order, edges, self.components, channel.clone());
        let orphans: FxHashSet<MessageId> = self.orphan_message_ids.into_iter().collect();
        let projector = ConversationProjector::from_parts(self.messages, orphans, channel.clone());
        (store, projector)
    }

    /// Serializes the snapshot to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serde { source: e })
    }

    /// Parses a snapshot, enforcing the version gate.
    pub fn from_json_str(s: &str) -> Result<Self, SnapshotError> {
        let snapshot: FlowSnapshot =
            serde_json::from_str(s).map_err(|e| SnapshotError::Serde { source: e })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// The lenient load path: malformed input or a version mismatch yields
    /// `None` (logged), so the caller falls back to an empty or default
    /// graph instead of failing startup.
    #[must_use]
    pub fn parse_or_none(s: &str) -> Option<Self> {
        match Self::from_json_str(s) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unusable persisted snapshot");
                None
            }
        }
    }
}

/// Storage boundary for persisted snapshots.
///
/// Real backends (browser storage, disk, a sync service) live outside the
/// engine; the contract is only that a failed save reports `Err` without
/// corrupting anything, and a load of nothing is `Ok(None)`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Loads the most recent snapshot, or `None` when nothing usable exists.
    async fn load(&self) -> Result<Option<FlowSnapshot>, SnapshotError>;

    /// Persists a snapshot, replacing any previous one.
    async fn save(&self, snapshot: &FlowSnapshot) -> Result<(), SnapshotError>;
}

/// In-memory snapshot store holding the serialized JSON form.
///
/// Round-trips through the real wire shape, so tests exercise the same
/// serialization path a browser-storage backend would.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw persisted JSON, if any. Useful for asserting on wire shape.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<FlowSnapshot>, SnapshotError> {
        let raw = self.slot.lock().unwrap().clone();
        match raw {
            Some(s) => FlowSnapshot::from_json_str(&s).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, snapshot: &FlowSnapshot) -> Result<(), SnapshotError> {
        let encoded = snapshot.to_json_string()?;
        *self.slot.lock().unwrap() = Some(encoded);
        Ok(())
    }
}
