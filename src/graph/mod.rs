//! Authoritative graph state and its deterministic flattening.
//!
//! [`GraphStore`] owns topology; [`resolve`] turns it into the linear message
//! order the preview renders. The store publishes, never renders; the preview
//! renders, never owns topology.

pub mod resolver;
pub mod store;

pub use resolver::{ResolvedOrder, resolve};
pub use store::{Component, Edge, GraphError, GraphStore, Node};
