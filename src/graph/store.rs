//! The authoritative node/edge/component store.
//!
//! `GraphStore` is the only writer of graph topology. Every mutation
//! re-resolves the linear order and republishes it on the event channel, so
//! the preview never observes a stale sequence. The store itself also consumes
//! the preview-side `deleteNode` signal and the shared `deleteMessage` signal.

use rustc_hash::FxHashMap;
use serde_json::Value;

use miette::Diagnostic;
use thiserror::Error;

use crate::event_bus::{EventChannel, FlowEvent};
use crate::graph::resolver::{self, ResolvedOrder};
use crate::types::{ComponentId, EdgeId, MessageId, NodeId, UiToolType};

/// A vertex on the canvas: one conversational step.
///
/// `message_id` may be absent briefly between node creation and message
/// materialization; such nodes are traversed but contribute nothing to the
/// resolved order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub outgoing: Vec<EdgeId>,
    pub incoming: Vec<EdgeId>,
    pub message_id: Option<MessageId>,
    pub component_id: Option<ComponentId>,
}

impl Node {
    /// A fresh node with no edges, message, or component.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            message_id: None,
            component_id: None,
        }
    }

    /// True when the node has no edges at all (an orphan candidate).
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// A directed precedence link between two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// The opaque authored payload behind a node.
///
/// The engine never interprets `content`; it only forwards it to the preview.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "uiToolType")]
    pub tool: UiToolType,
    pub content: Value,
}

/// Errors returned to the (external) canvas editor for invalid mutations.
///
/// Events racing with deletions are a different matter and are silent no-ops;
/// these errors cover direct API misuse where the caller can act on them.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("unknown node: {0}")]
    #[diagnostic(
        code(chatloom::graph::unknown_node),
        help("The node was never added or has been removed.")
    )]
    UnknownNode(NodeId),

    #[error("unknown edge: {0}")]
    #[diagnostic(code(chatloom::graph::unknown_edge))]
    UnknownEdge(EdgeId),

    #[error("duplicate node id: {0}")]
    #[diagnostic(
        code(chatloom::graph::duplicate_node),
        help("Node ids must be unique within one graph.")
    )]
    DuplicateNode(NodeId),

    #[error("duplicate edge id: {0}")]
    #[diagnostic(code(chatloom::graph::duplicate_edge))]
    DuplicateEdge(EdgeId),

    #[error("node {0} already has a message")]
    #[diagnostic(
        code(chatloom::graph::already_materialized),
        help("A node gains its message exactly once; update it through updateMessage events.")
    )]
    AlreadyMaterialized(NodeId),

    #[error("node {0} has no component")]
    #[diagnostic(
        code(chatloom::graph::missing_component),
        help("Attach a component before materializing the node's message.")
    )]
    MissingComponent(NodeId),
}

/// The authoritative graph of nodes, edges, and components.
///
/// Nodes are kept in stable insertion order, which is the resolver's tie-break
/// and fallback scan order. Mutations publish [`FlowEvent`]s on the channel
/// handed in at construction; a store built with a subscriber-less channel is
/// fully functional and simply publishes into the void, which keeps pure
/// resolver tests free of wiring.
///
/// # Examples
///
/// ```
/// use chatloom::event_bus::EventChannel;
/// use chatloom::graph::GraphStore;
/// use chatloom::types::{EdgeId, NodeId};
///
/// let mut store = GraphStore::new(EventChannel::new());
/// store.add_node(NodeId::from("n1")).unwrap();
/// store.add_node(NodeId::from("n2")).unwrap();
/// store.connect(EdgeId::from("e1"), &NodeId::from("n1"), &NodeId::from("n2")).unwrap();
/// assert_eq!(store.node_count(), 2);
/// ```
pub struct GraphStore {
    nodes: FxHashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: FxHashMap<EdgeId, Edge>,
    components: FxHashMap<ComponentId, Component>,
    channel: EventChannel,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(EventChannel::new())
    }
}

impl GraphStore {
    /// Creates an empty store publishing on `channel`.
    #[must_use]
    pub fn new(channel: EventChannel) -> Self {
        Self {
            nodes: FxHashMap::default(),
            node_order: Vec::new(),
            edges: FxHashMap::default(),
            components: FxHashMap::default(),
            channel,
        }
    }

    /// Rebuilds a store from persisted parts without publishing any events.
    ///
    /// `node_order` defines insertion order; ids missing from `nodes` are
    /// dropped silently.
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, Node>,
        node_order: Vec<NodeId>,
        edges: FxHashMap<EdgeId, Edge>,
        components: FxHashMap<ComponentId, Component>,
        channel: EventChannel,
    ) -> Self {
        let node_order = node_order
            .into_iter()
            .filter(|id| nodes.contains_key(id))
            .collect();
        Self {
            nodes,
            node_order,
            edges,
            components,
            channel,
        }
    }

    // ------------------------------------------------------------------
    // Topology mutations (canvas-driven)
    // ------------------------------------------------------------------

    /// Adds a node with no edges yet. New nodes go to the end of the
    /// insertion order.
    pub fn add_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.node_order.push(id.clone());
        self.nodes.insert(id.clone(), Node::new(id));
        self.sync();
        Ok(())
    }

    /// Attaches (or replaces) the authored component behind a node.
    pub fn attach_component(
        &mut self,
        node_id: &NodeId,
        component: Component,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        if let Some(old) = node.component_id.take() {
            self.components.remove(&old);
        }
        node.component_id = Some(component.id.clone());
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    /// Gives a node its message id, announcing the new message to the preview.
    ///
    /// This is the one-shot transition from "node exists on the canvas" to
    /// "node occupies a transcript slot"; the node must already carry a
    /// component so the preview knows which body variant to materialize.
    pub fn materialize_message(
        &mut self,
        node_id: &NodeId,
        message_id: MessageId,
        show_dropdown: bool,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        if node.message_id.is_some() {
            return Err(GraphError::AlreadyMaterialized(node_id.clone()));
        }
        let component_id = node
            .component_id
            .clone()
            .ok_or_else(|| GraphError::MissingComponent(node_id.clone()))?;
        let tool = self
            .components
            .get(&component_id)
            .map(|c| c.tool)
            .ok_or_else(|| GraphError::MissingComponent(node_id.clone()))?;

        if let Some(node) = self.nodes.get_mut(node_id) {
            node.message_id = Some(message_id.clone());
        }

        self.channel.publish(FlowEvent::AddMessage {
            message_id,
            component_id,
            ui_tool_type: tool,
            show_dropdown,
        });
        self.sync();
        Ok(())
    }

    /// Changes a component's tool type and dropdown affordance, forwarding the
    /// change to the preview when the node is materialized.
    pub fn set_tool(
        &mut self,
        node_id: &NodeId,
        tool: UiToolType,
        show_dropdown: bool,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        let component_id = node
            .component_id
            .clone()
            .ok_or_else(|| GraphError::MissingComponent(node_id.clone()))?;
        let message_id = node.message_id.clone();
        if let Some(component) = self.components.get_mut(&component_id) {
            component.tool = tool;
        }
        if let Some(message_id) = message_id {
            self.channel.publish(FlowEvent::UpdateMessage {
                message_id,
                ui_tool_type: tool,
                show_dropdown,
            });
        }
        Ok(())
    }

    /// Replaces a component's opaque content, forwarding it to the preview
    /// when the node is materialized. The engine never inspects the value.
    pub fn set_component_content(
        &mut self,
        node_id: &NodeId,
        content: Value,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        let component_id = node
            .component_id
            .clone()
            .ok_or_else(|| GraphError::MissingComponent(node_id.clone()))?;
        let message_id = node.message_id.clone();
        if let Some(component) = self.components.get_mut(&component_id) {
            component.content = content.clone();
        }
        if let Some(message_id) = message_id {
            self.channel.publish(FlowEvent::UpdateComponentData {
                message_id,
                component_data: content,
            });
        }
        Ok(())
    }

    /// Connects two nodes with a directed edge.
    pub fn connect(
        &mut self,
        edge_id: EdgeId,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge_id) {
            return Err(GraphError::DuplicateEdge(edge_id));
        }
        if !self.nodes.contains_key(source) {
            return Err(GraphError::UnknownNode(source.clone()));
        }
        if !self.nodes.contains_key(target) {
            return Err(GraphError::UnknownNode(target.clone()));
        }
        self.edges.insert(
            edge_id.clone(),
            Edge {
                id: edge_id.clone(),
                source: source.clone(),
                target: target.clone(),
            },
        );
        if let Some(node) = self.nodes.get_mut(source) {
            node.outgoing.push(edge_id.clone());
        }
        if let Some(node) = self.nodes.get_mut(target) {
            node.incoming.push(edge_id);
        }
        self.sync();
        Ok(())
    }

    /// Removes an edge, leaving both endpoint nodes in place.
    pub fn disconnect(&mut self, edge_id: &EdgeId) -> Result<(), GraphError> {
        let edge = self
            .edges
            .remove(edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.clone()))?;
        if let Some(node) = self.nodes.get_mut(&edge.source) {
            node.outgoing.retain(|e| e != edge_id);
        }
        if let Some(node) = self.nodes.get_mut(&edge.target) {
            node.incoming.retain(|e| e != edge_id);
        }
        self.sync();
        Ok(())
    }

    /// Removes a node with all its edges and component, announcing the
    /// message deletion to the preview when the node was materialized.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<(), GraphError> {
        self.remove_node_inner(node_id, true)?;
        self.sync();
        Ok(())
    }

    fn remove_node_inner(
        &mut self,
        node_id: &NodeId,
        announce_delete: bool,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        self.node_order.retain(|id| id != node_id);

        let mut edge_ids = node.outgoing;
        for id in node.incoming {
            if !edge_ids.contains(&id) {
                edge_ids.push(id);
            }
        }
        for edge_id in edge_ids {
            if let Some(edge) = self.edges.remove(&edge_id) {
                if let Some(other) = self.nodes.get_mut(&edge.source) {
                    other.outgoing.retain(|e| e != &edge_id);
                }
                if let Some(other) = self.nodes.get_mut(&edge.target) {
                    other.incoming.retain(|e| e != &edge_id);
                }
            }
        }
        if let Some(component_id) = node.component_id {
            self.components.remove(&component_id);
        }
        if announce_delete {
            if let Some(message_id) = node.message_id {
                self.channel.publish(FlowEvent::delete_one(message_id));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Event consumption (preview-driven)
    // ------------------------------------------------------------------

    /// Reacts to the events this pane consumes: `deleteNode` from the preview
    /// and `deleteMessage` from either pane. Everything else is ignored.
    ///
    /// Unknown message ids are silent no-ops; delete signals legitimately
    /// race with local deletions.
    pub fn apply(&mut self, event: &FlowEvent) {
        match event {
            FlowEvent::DeleteNode { message_id } => {
                match self.find_node_by_message(message_id).map(|n| n.id.clone()) {
                    Some(node_id) => {
                        // Announce: the preview removes its entry only once the
                        // authoritative side confirms with deleteMessage.
                        if self.remove_node_inner(&node_id, true).is_ok() {
                            self.sync();
                        }
                    }
                    None => {
                        tracing::debug!(%message_id, "deleteNode for unknown message; ignoring");
                    }
                }
            }
            FlowEvent::DeleteMessage { message_ids } => {
                let mut removed = false;
                for message_id in message_ids {
                    if let Some(node_id) = self.find_node_by_message(message_id).map(|n| n.id.clone())
                    {
                        // Do not re-announce a delete we are reacting to.
                        removed |= self.remove_node_inner(&node_id, false).is_ok();
                    }
                }
                if removed {
                    self.sync();
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Computes the current linear order and orphan set.
    #[must_use]
    pub fn resolve(&self) -> ResolvedOrder {
        resolver::resolve(self)
    }

    /// Publishes the freshly resolved order. Called after every topology
    /// mutation; also useful once after restoring a snapshot.
    pub fn sync(&self) {
        let resolved = self.resolve();
        self.channel.publish(FlowEvent::SyncMessageOrder {
            order: resolved.order,
            orphan_ids: resolved.orphans,
        });
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Node ids in stable insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.node_order.iter()
    }

    /// Nodes in stable insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// All edges, in arbitrary order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    #[must_use]
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// All components, in arbitrary order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    #[must_use]
    pub fn find_node_by_message(&self, message_id: &MessageId) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.message_id.as_ref() == Some(message_id))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The channel this store publishes on.
    #[must_use]
    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }
}
