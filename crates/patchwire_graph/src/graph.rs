// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patch graph: node identity map, link mutation and edge resolution.

use crate::binding::{InstanceId, LinkBinding};
use crate::matcher::TypeMatcher;
use crate::node::{Edge, GraphNode};
use crate::port::PortDirection;
use crate::settings::WiringSettings;
use crate::store::{
    BindingStore, NodeInstance, NodeInstanceSource, Position, PositionStore, StoreError,
};
use crate::value::ValueKind;
use indexmap::IndexMap;
use std::rc::Rc;

/// The nodes of one patch, backed by a host store
pub struct Graph<S> {
    store: S,
    settings: WiringSettings,
    matcher: TypeMatcher,
    nodes: IndexMap<InstanceId, GraphNode>,
    /// Monotonic creation index used for fallback placement
    created: usize,
}

impl<S: PositionStore + BindingStore> Graph<S> {
    /// Build a graph from enumerated instances with default settings
    pub fn build(
        store: S,
        instances: impl IntoIterator<Item = NodeInstance>,
    ) -> Result<Self, GraphError> {
        Self::build_with_settings(store, WiringSettings::default(), instances)
    }

    /// Build a graph from enumerated instances
    pub fn build_with_settings(
        store: S,
        settings: WiringSettings,
        instances: impl IntoIterator<Item = NodeInstance>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            store,
            matcher: TypeMatcher::new(settings.match_rules.clone()),
            settings,
            nodes: IndexMap::new(),
            created: 0,
        };
        graph.nodes = graph.collect_nodes(instances)?;
        tracing::debug!("Built graph with {} nodes", graph.nodes.len());
        Ok(graph)
    }

    /// Build a graph from the store's own enumeration
    pub fn from_source(store: S) -> Result<Self, GraphError>
    where
        S: NodeInstanceSource,
    {
        let instances = store.enumerate_nodes();
        Self::build(store, instances)
    }

    /// Rebuild the identity map from a fresh enumeration.
    ///
    /// All edge caches are dropped and positions are re-read from the store.
    /// On error the previous identity map is kept.
    pub fn rescan(
        &mut self,
        instances: impl IntoIterator<Item = NodeInstance>,
    ) -> Result<(), GraphError> {
        self.nodes = self.collect_nodes(instances)?;
        tracing::debug!("Rescanned graph: {} nodes", self.nodes.len());
        Ok(())
    }

    /// Rescan from the store's own enumeration
    pub fn rescan_from_source(&mut self) -> Result<(), GraphError>
    where
        S: NodeInstanceSource,
    {
        let instances = self.store.enumerate_nodes();
        self.rescan(instances)
    }

    /// Register one newly created instance
    pub fn add_node(&mut self, instance: NodeInstance) -> Result<&GraphNode, GraphError> {
        let id = instance.id;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateIdentity(id));
        }

        let node = self.wrap(instance)?;
        let (index, _) = self.nodes.insert_full(id, node);
        // Bindings that pointed at this identity resolve from now on.
        self.invalidate_all();

        tracing::debug!("Added node {}", id);
        Ok(&self.nodes[index])
    }

    fn collect_nodes(
        &mut self,
        instances: impl IntoIterator<Item = NodeInstance>,
    ) -> Result<IndexMap<InstanceId, GraphNode>, GraphError> {
        let mut nodes = IndexMap::new();
        for instance in instances {
            let id = instance.id;
            if nodes.contains_key(&id) {
                return Err(GraphError::DuplicateIdentity(id));
            }
            let node = self.wrap(instance)?;
            nodes.insert(id, node);
        }
        Ok(nodes)
    }

    fn wrap(&mut self, instance: NodeInstance) -> Result<GraphNode, GraphError> {
        let id = instance.id;
        let index = self.created;
        self.created += 1;

        let position = match self.store.position(id) {
            Some(position) => position,
            None => {
                let fallback = self.settings.fallback_layout.position_for(index);
                self.store.set_position(id, fallback)?;
                fallback
            }
        };

        Ok(GraphNode::new(instance, position))
    }

    /// Move a node; the store is written before the in-memory mirror
    pub fn set_position(&mut self, node: InstanceId, x: f32, y: f32) -> Result<(), GraphError> {
        let graph_node = self.nodes.get(&node).ok_or(GraphError::NodeNotFound(node))?;
        let position = Position::new(x, y);
        self.store.set_position(node, position)?;
        graph_node.mirror_position(position);
        Ok(())
    }

    /// Create a link from an outlet to an inlet.
    ///
    /// Creating the same link twice adds a second binding; use
    /// [`has_link`](Self::has_link) first for single-link semantics.
    pub fn create_link(
        &mut self,
        from: InstanceId,
        from_port: &str,
        to: InstanceId,
        to_port: &str,
    ) -> Result<Edge, LinkError> {
        let source = self.nodes.get(&from).ok_or(LinkError::NodeNotFound(from))?;
        let target = self.nodes.get(&to).ok_or(LinkError::NodeNotFound(to))?;

        let outlet = source.outlet(from_port).ok_or_else(|| LinkError::PortNotFound {
            node: from,
            port: from_port.to_string(),
            direction: PortDirection::Outlet,
        })?;
        let inlet = target.inlet(to_port).ok_or_else(|| LinkError::PortNotFound {
            node: to,
            port: to_port.to_string(),
            direction: PortDirection::Inlet,
        })?;

        if !self.matcher.can_bind(outlet.descriptor.kind, inlet.descriptor.kind) {
            return Err(LinkError::PortKindMismatch {
                outlet: outlet.descriptor.kind,
                inlet: inlet.descriptor.kind,
            });
        }

        let edge = Edge {
            from,
            from_port: outlet.descriptor.clone(),
            to,
            to_port: inlet.descriptor.clone(),
        };

        self.store
            .append_binding(from, LinkBinding::new(from_port, to, to_port))?;
        source.invalidate();

        tracing::debug!(
            "Linked {}.{} -> {}.{}",
            source.name(),
            from_port,
            target.name(),
            to_port
        );
        Ok(edge)
    }

    /// Remove the first binding from `from.from_port` to `to.to_port`
    pub fn remove_link(
        &mut self,
        from: InstanceId,
        from_port: &str,
        to: InstanceId,
        to_port: &str,
    ) -> Result<(), LinkError> {
        let source = self.nodes.get(&from).ok_or(LinkError::NodeNotFound(from))?;

        let index = self
            .store
            .bindings(from, from_port)
            .iter()
            .position(|b| b.targets(to, to_port))
            .ok_or_else(|| LinkError::LinkNotFound {
                from,
                from_port: from_port.to_string(),
                to,
                to_port: to_port.to_string(),
            })?;

        self.store.remove_binding(from, from_port, index)?;
        source.invalidate();

        tracing::debug!("Unlinked {}.{} -> {}.{}", source.name(), from_port, to, to_port);
        Ok(())
    }

    /// Remove a node from the graph and every binding that targets it.
    ///
    /// The host's own record of the node is left alone; see
    /// [`delete_node`](Self::delete_node). If a store write fails the node
    /// stays in the graph.
    pub fn remove_node(&mut self, id: InstanceId) -> Result<GraphNode, LinkError> {
        if !self.nodes.contains_key(&id) {
            return Err(LinkError::NodeNotFound(id));
        }

        let dropped = self.unlink_incoming(id)?;
        let removed = self.nodes.shift_remove(&id).ok_or(LinkError::NodeNotFound(id))?;

        tracing::debug!("Removed node {} and {} bindings to it", removed.name(), dropped);
        Ok(removed)
    }

    /// Remove a node as [`remove_node`](Self::remove_node) does, then have the
    /// host destroy the instance so later rescans do not bring it back.
    pub fn delete_node(&mut self, id: InstanceId) -> Result<GraphNode, LinkError>
    where
        S: NodeInstanceSource,
    {
        if !self.nodes.contains_key(&id) {
            return Err(LinkError::NodeNotFound(id));
        }

        let dropped = self.unlink_incoming(id)?;
        self.store.destroy_node(id)?;
        let removed = self.nodes.shift_remove(&id).ok_or(LinkError::NodeNotFound(id))?;

        tracing::debug!("Deleted node {} and {} bindings to it", removed.name(), dropped);
        Ok(removed)
    }

    fn unlink_incoming(&mut self, id: InstanceId) -> Result<usize, StoreError> {
        let mut dropped = 0;
        for node in self.nodes.values().filter(|n| n.id() != id) {
            for outlet in node.outlets() {
                let name = &outlet.descriptor.name;
                let bindings = self.store.bindings(node.id(), name);
                // Back to front so earlier indices stay valid.
                for (index, binding) in bindings.iter().enumerate().rev() {
                    if binding.target == id {
                        node.invalidate();
                        self.store.remove_binding(node.id(), name, index)?;
                        dropped += 1;
                    }
                }
            }
        }
        Ok(dropped)
    }

    /// Outgoing edges of a node, resolved lazily and cached
    pub fn outgoing_edges(&self, id: InstanceId) -> Option<Rc<[Edge]>> {
        let node = self.nodes.get(&id)?;
        Some(node.outgoing_edges(|target| self.nodes.get(&target), &self.store, &self.matcher))
    }

    /// Edges leaving one outlet of a node
    pub fn links_from(&self, id: InstanceId, outlet: &str) -> Vec<Edge> {
        self.outgoing_edges(id)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|e| e.from_port.name == outlet)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edges arriving at one inlet of a node, from any source
    pub fn links_into(&self, id: InstanceId, inlet: &str) -> Vec<Edge> {
        self.edges()
            .into_iter()
            .filter(|e| e.to == id && e.to_port.name == inlet)
            .collect()
    }

    /// All edges of the patch, grouped by source node
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .keys()
            .filter_map(|id| self.outgoing_edges(*id))
            .flat_map(|edges| edges.to_vec())
            .collect()
    }

    /// Check if at least one link connects the given ports
    pub fn has_link(
        &self,
        from: InstanceId,
        from_port: &str,
        to: InstanceId,
        to_port: &str,
    ) -> bool {
        self.outgoing_edges(from).is_some_and(|edges| {
            edges
                .iter()
                .any(|e| e.from_port.name == from_port && e.to == to && e.to_port.name == to_port)
        })
    }

    /// Install invokers for every resolved edge into the outlets' event sinks.
    ///
    /// Previously installed listeners are replaced.
    pub fn arm_outlets(&self) {
        for node in self.nodes.values() {
            for outlet in node.outlets() {
                outlet.sink.clear();
            }
        }

        let mut armed = 0;
        for edge in self.edges() {
            let (Some(source), Some(target)) =
                (self.nodes.get(&edge.from), self.nodes.get(&edge.to))
            else {
                continue;
            };
            let (Some(outlet), Some(inlet)) = (
                source.outlet(&edge.from_port.name),
                target.inlet(&edge.to_port.name),
            ) else {
                continue;
            };

            if let Some(invoker) = self.matcher.synthesize_invoker(
                outlet.descriptor.kind,
                inlet.descriptor.kind,
                target.instance(),
                inlet.callable().clone(),
            ) {
                outlet.sink.add_listener(invoker);
                armed += 1;
            }
        }

        tracing::debug!("Armed {} outlet listeners", armed);
    }
}

impl<S> Graph<S> {
    /// Get a node by identity
    pub fn lookup(&self, id: InstanceId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// All nodes in enumeration order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// All node identities
    pub fn node_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Active settings
    pub fn settings(&self) -> &WiringSettings {
        &self.settings
    }

    /// Compatibility rules in use
    pub fn matcher(&self) -> &TypeMatcher {
        &self.matcher
    }

    /// The host store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the host store.
    ///
    /// Changes made here are not seen until the affected nodes are invalidated,
    /// typically by [`rescan`](Self::rescan).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Drop every node's edge cache
    pub fn invalidate_all(&self) {
        for node in self.nodes.values() {
            node.invalidate();
        }
    }

    /// Release the store
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> std::fmt::Debug for Graph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Error when creating or removing a link
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(InstanceId),

    /// Port not found
    #[error("{direction:?} '{port}' not found on node {node}")]
    PortNotFound {
        /// Node searched
        node: InstanceId,
        /// Port name
        port: String,
        /// Expected direction
        direction: PortDirection,
    },

    /// Incompatible port kinds
    #[error("Cannot bind {outlet} outlet to {inlet} inlet")]
    PortKindMismatch {
        /// Outlet kind
        outlet: ValueKind,
        /// Inlet kind
        inlet: ValueKind,
    },

    /// No such link
    #[error("No link {from}.{from_port} -> {to}.{to_port}")]
    LinkNotFound {
        /// Source node
        from: InstanceId,
        /// Source outlet
        from_port: String,
        /// Target node
        to: InstanceId,
        /// Target inlet
        to_port: String,
    },

    /// Store write failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Error when building, rescanning or placing nodes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Two instances share an identity
    #[error("Duplicate node identity: {0}")]
    DuplicateIdentity(InstanceId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(InstanceId),

    /// Store write failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
