// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collaborator interfaces implemented by the host environment.
//!
//! The graph never owns persisted state. Node instances, positions and
//! bindings live in the host, which may change them behind the graph's back
//! (undo/redo, reload, scripted edits). The graph re-reads them whenever a
//! cache is rebuilt.

use crate::binding::{InstanceId, LinkBinding};
use crate::discovery::NodeHandle;
use serde::{Deserialize, Serialize};

/// Persisted 2-D position of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Sentinel some hosts persist for "never placed"
    pub const UNINITIALIZED: Position = Position { x: -1000.0, y: -1000.0 };

    /// Create a position
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Check for the uninitialized sentinel
    pub fn is_uninitialized(&self) -> bool {
        *self == Self::UNINITIALIZED
    }
}

/// A node instance as enumerated by the host
#[derive(Clone)]
pub struct NodeInstance {
    /// Stable identity
    pub id: InstanceId,
    /// Instance name (e.g. the scene object name)
    pub name: String,
    /// The node itself
    pub node: NodeHandle,
}

impl NodeInstance {
    /// Create a node instance record
    pub fn new(id: InstanceId, name: impl Into<String>, node: NodeHandle) -> Self {
        Self {
            id,
            name: name.into(),
            node,
        }
    }
}

impl std::fmt::Debug for NodeInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_name = self
            .node
            .try_borrow()
            .map(|n| n.type_name())
            .unwrap_or("<borrowed>");
        f.debug_struct("NodeInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &type_name)
            .finish()
    }
}

/// Error reported by a host store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The store has no record of the node
    #[error("Unknown node: {0}")]
    UnknownNode(InstanceId),

    /// Binding index out of range
    #[error("No binding {index} on outlet '{outlet}' of node {node}")]
    BindingOutOfRange {
        /// Source node
        node: InstanceId,
        /// Outlet name
        outlet: String,
        /// Requested index
        index: usize,
    },

    /// Backend-specific failure
    #[error("Store write failed: {0}")]
    Backend(String),
}

/// Enumerates and destroys the node instances of one patch
pub trait NodeInstanceSource {
    /// All node instances, in a stable order
    fn enumerate_nodes(&self) -> Vec<NodeInstance>;

    /// Destroy an instance together with its own position and bindings.
    ///
    /// Afterwards the instance no longer appears in
    /// [`enumerate_nodes`](Self::enumerate_nodes).
    fn destroy_node(&mut self, node: InstanceId) -> Result<(), StoreError>;
}

/// Reads and writes persisted node positions
pub trait PositionStore {
    /// Stored position, or `None` if the node was never placed
    fn position(&self, node: InstanceId) -> Option<Position>;

    /// Persist a position
    fn set_position(&mut self, node: InstanceId, position: Position) -> Result<(), StoreError>;
}

/// Persists the ordered bindings of every outlet
pub trait BindingStore {
    /// Bindings of one outlet, in firing order
    fn bindings(&self, node: InstanceId, outlet: &str) -> Vec<LinkBinding>;

    /// Append a binding to the outlet named by `binding.source_port`
    fn append_binding(&mut self, node: InstanceId, binding: LinkBinding) -> Result<(), StoreError>;

    /// Remove the binding at `index` of an outlet
    fn remove_binding(
        &mut self,
        node: InstanceId,
        outlet: &str,
        index: usize,
    ) -> Result<LinkBinding, StoreError>;
}
