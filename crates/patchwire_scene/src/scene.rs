// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory scene implementing the graph's host stores.

use crate::history::{History, HistoryError};
use indexmap::IndexMap;
use patchwire_graph::{
    BindingStore, InstanceId, LinkBinding, NodeHandle, NodeInstance, NodeInstanceSource, Position,
    PositionStore, StoreError,
};
use serde::{Deserialize, Serialize};

/// Outlet name -> ordered bindings
pub type OutletBindings = IndexMap<String, Vec<LinkBinding>>;

/// Everything the scene persists and can undo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Live node names, in creation order
    pub nodes: IndexMap<InstanceId, String>,
    /// Node positions; absent or sentinel means never placed
    pub positions: IndexMap<InstanceId, Position>,
    /// Bindings per node and outlet
    pub bindings: IndexMap<InstanceId, OutletBindings>,
}

/// Scene errors
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Undo/redo failed
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Two nodes share an identity
    #[error("Duplicate node identity: {0}")]
    DuplicateIdentity(InstanceId),

    /// Store mutation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// A patch's node instances plus their persisted state.
///
/// Which nodes are live is part of the persisted state, so deleting a node
/// can be undone. Instances are kept after deletion for that reason.
pub struct Scene {
    name: String,
    instances: IndexMap<InstanceId, NodeHandle>,
    state: PersistedState,
    history: History,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: IndexMap::new(),
            state: PersistedState::default(),
            history: History::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node under a fresh identity
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        node: NodeHandle,
    ) -> Result<InstanceId, SceneError> {
        let id = InstanceId::new();
        self.insert_node(id, name, node)?;
        Ok(id)
    }

    /// Add a node under a known identity
    pub fn insert_node(
        &mut self,
        id: InstanceId,
        name: impl Into<String>,
        node: NodeHandle,
    ) -> Result<(), SceneError> {
        if self.instances.contains_key(&id) {
            return Err(SceneError::DuplicateIdentity(id));
        }

        let name = name.into();
        self.mutate("New Node", |state| {
            state.nodes.insert(id, name);
            Ok(())
        })?;
        self.instances.insert(id, node);
        Ok(())
    }

    /// Delete a node with its position, its own bindings and every binding
    /// that targets it, as one undoable step
    pub fn remove_node(&mut self, id: InstanceId) -> Result<NodeHandle, StoreError> {
        let node = self.node(id).cloned().ok_or(StoreError::UnknownNode(id))?;
        self.mutate("Delete Node", |state| {
            state.nodes.shift_remove(&id);
            state.positions.shift_remove(&id);
            state.bindings.shift_remove(&id);
            for list in state.bindings.values_mut().flat_map(|outlets| outlets.values_mut()) {
                list.retain(|binding| binding.target != id);
            }
            Ok(())
        })?;
        Ok(node)
    }

    /// Live node handle by identity
    pub fn node(&self, id: InstanceId) -> Option<&NodeHandle> {
        if self.state.nodes.contains_key(&id) {
            self.instances.get(&id)
        } else {
            None
        }
    }

    /// Live node name by identity
    pub fn node_name(&self, id: InstanceId) -> Option<&str> {
        self.state.nodes.get(&id).map(String::as_str)
    }

    /// Identity, name and type name of every live node, in creation order
    pub fn enumerate(&self) -> impl Iterator<Item = (InstanceId, &str, &'static str)> + '_ {
        self.live().map(|(id, name, node)| (id, name, node.borrow().type_name()))
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.live().count()
    }

    /// Persisted state
    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Replace the persisted state wholesale (e.g. after loading)
    pub fn restore_state(&mut self, state: PersistedState) {
        let orphans = state
            .nodes
            .keys()
            .filter(|id| !self.instances.contains_key(*id))
            .count();
        if orphans > 0 {
            tracing::warn!("Restored state names {} nodes without an instance", orphans);
        }

        self.state = state;
        self.history.clear();
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Revert the last recorded mutation
    pub fn undo(&mut self) -> Result<(), SceneError> {
        let operation = self.history.undo()?;
        self.state = operation.before.to_value()?;
        tracing::debug!("Undo: {}", operation.description);
        Ok(())
    }

    /// Re-apply the last undone mutation
    pub fn redo(&mut self) -> Result<(), SceneError> {
        let operation = self.history.redo()?;
        self.state = operation.after.to_value()?;
        tracing::debug!("Redo: {}", operation.description);
        Ok(())
    }

    fn live(&self) -> impl Iterator<Item = (InstanceId, &str, &NodeHandle)> + '_ {
        self.state.nodes.iter().filter_map(|(id, name)| {
            self.instances.get(id).map(|node| (*id, name.as_str(), node))
        })
    }

    fn mutate<R>(
        &mut self,
        description: &str,
        apply: impl FnOnce(&mut PersistedState) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let before = self.state.clone();
        let result = apply(&mut self.state)?;
        if let Err(e) = self.history.record(description, &before, &self.state) {
            self.state = before;
            return Err(StoreError::Backend(e.to_string()));
        }
        Ok(result)
    }

    fn ensure_node(&self, id: InstanceId) -> Result<(), StoreError> {
        if self.state.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::UnknownNode(id))
        }
    }
}

impl NodeInstanceSource for Scene {
    fn enumerate_nodes(&self) -> Vec<NodeInstance> {
        self.live()
            .map(|(id, name, node)| NodeInstance::new(id, name, node.clone()))
            .collect()
    }

    fn destroy_node(&mut self, node: InstanceId) -> Result<(), StoreError> {
        self.remove_node(node).map(|_| ())
    }
}

impl PositionStore for Scene {
    fn position(&self, node: InstanceId) -> Option<Position> {
        self.state
            .positions
            .get(&node)
            .copied()
            .filter(|p| !p.is_uninitialized())
    }

    fn set_position(&mut self, node: InstanceId, position: Position) -> Result<(), StoreError> {
        self.ensure_node(node)?;
        self.mutate("Move Node", |state| {
            state.positions.insert(node, position);
            Ok(())
        })
    }
}

impl BindingStore for Scene {
    fn bindings(&self, node: InstanceId, outlet: &str) -> Vec<LinkBinding> {
        self.state
            .bindings
            .get(&node)
            .and_then(|outlets| outlets.get(outlet))
            .cloned()
            .unwrap_or_default()
    }

    fn append_binding(&mut self, node: InstanceId, binding: LinkBinding) -> Result<(), StoreError> {
        self.ensure_node(node)?;
        self.mutate("New Link", |state| {
            state
                .bindings
                .entry(node)
                .or_default()
                .entry(binding.source_port.clone())
                .or_default()
                .push(binding);
            Ok(())
        })
    }

    fn remove_binding(
        &mut self,
        node: InstanceId,
        outlet: &str,
        index: usize,
    ) -> Result<LinkBinding, StoreError> {
        self.mutate("Remove Link", |state| {
            state
                .bindings
                .get_mut(&node)
                .and_then(|outlets| outlets.get_mut(outlet))
                .filter(|list| index < list.len())
                .map(|list| list.remove(index))
                .ok_or_else(|| StoreError::BindingOutOfRange {
                    node,
                    outlet: outlet.to_string(),
                    index,
                })
        })
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("nodes", &self.state.nodes.len())
            .field("state", &self.state)
            .finish()
    }
}
