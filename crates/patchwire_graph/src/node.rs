// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-side wrapper around one node instance.

use crate::binding::InstanceId;
use crate::discovery::{discover, Inlet, NodeHandle, Outlet};
use crate::matcher::TypeMatcher;
use crate::port::{nicify_name, PortDescriptor, PortDirection};
use crate::store::{BindingStore, NodeInstance, Position};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A resolved link between two nodes.
///
/// Edges are derived from [`LinkBinding`](crate::LinkBinding)s and refer to
/// nodes only by identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub from: InstanceId,
    /// Source outlet
    pub from_port: PortDescriptor,
    /// Target node
    pub to: InstanceId,
    /// Target inlet
    pub to_port: PortDescriptor,
}

impl Edge {
    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node: InstanceId) -> bool {
        self.from == node || self.to == node
    }
}

/// A node instance together with its discovered ports
pub struct GraphNode {
    id: InstanceId,
    name: String,
    type_name: &'static str,
    instance: NodeHandle,
    inlets: Vec<Inlet>,
    outlets: Vec<Outlet>,
    position: Cell<Position>,
    cached_edges: RefCell<Option<Rc<[Edge]>>>,
}

impl GraphNode {
    /// Discover ports for an instance
    pub(crate) fn new(instance: NodeInstance, position: Position) -> Self {
        let (ports, type_name) = {
            let node = instance.node.borrow();
            (discover(&*node), node.type_name())
        };

        Self {
            id: instance.id,
            name: instance.name,
            type_name,
            instance: instance.node,
            inlets: ports.inlets,
            outlets: ports.outlets,
            position: Cell::new(position),
            cached_edges: RefCell::new(None),
        }
    }

    /// Instance identity
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node type name
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Title shown in the editor, e.g. "Lfo (Oscillator)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", nicify_name(&self.name), self.type_name)
    }

    /// The wrapped instance
    pub fn instance(&self) -> &NodeHandle {
        &self.instance
    }

    /// Inlets in discovery order
    pub fn inlets(&self) -> &[Inlet] {
        &self.inlets
    }

    /// Outlets in discovery order
    pub fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }

    /// Port descriptors of one direction, in discovery order
    pub fn ports(&self, direction: PortDirection) -> Vec<&PortDescriptor> {
        match direction {
            PortDirection::Inlet => self.inlets.iter().map(|i| &i.descriptor).collect(),
            PortDirection::Outlet => self.outlets.iter().map(|o| &o.descriptor).collect(),
        }
    }

    /// Get an inlet by name
    pub fn inlet(&self, name: &str) -> Option<&Inlet> {
        self.inlets.iter().find(|i| i.descriptor.name == name)
    }

    /// Get an outlet by name
    pub fn outlet(&self, name: &str) -> Option<&Outlet> {
        self.outlets.iter().find(|o| o.descriptor.name == name)
    }

    /// Last position read from or written to the position store
    pub fn position(&self) -> Position {
        self.position.get()
    }

    pub(crate) fn mirror_position(&self, position: Position) {
        self.position.set(position);
    }

    /// Whether the edge cache is populated
    pub fn has_cached_edges(&self) -> bool {
        self.cached_edges.borrow().is_some()
    }

    /// Drop the cached edge list
    pub fn invalidate(&self) {
        self.cached_edges.borrow_mut().take();
    }

    /// Outgoing edges, resolved from the store on first use after invalidation.
    ///
    /// Bindings whose target node or inlet cannot be found, or whose kinds no
    /// longer bind, produce no edge.
    pub(crate) fn outgoing_edges<'a, F>(
        &self,
        lookup: F,
        store: &dyn BindingStore,
        matcher: &TypeMatcher,
    ) -> Rc<[Edge]>
    where
        F: Fn(InstanceId) -> Option<&'a GraphNode>,
    {
        if let Some(edges) = self.cached_edges.borrow().as_ref() {
            return Rc::clone(edges);
        }

        let mut edges = Vec::new();
        for outlet in &self.outlets {
            for binding in store.bindings(self.id, &outlet.descriptor.name) {
                let Some(target) = lookup(binding.target) else {
                    tracing::trace!(
                        "Dropping binding {}.{}: node {} is gone",
                        self.name,
                        outlet.descriptor.name,
                        binding.target
                    );
                    continue;
                };

                let Some(inlet) = target.inlet(&binding.target_port) else {
                    tracing::trace!(
                        "Dropping binding {}.{}: {} has no inlet '{}'",
                        self.name,
                        outlet.descriptor.name,
                        target.name,
                        binding.target_port
                    );
                    continue;
                };

                if !matcher.can_bind(outlet.descriptor.kind, inlet.descriptor.kind) {
                    tracing::trace!(
                        "Dropping binding {}.{} -> {}.{}: {} no longer binds to {}",
                        self.name,
                        outlet.descriptor.name,
                        target.name,
                        inlet.descriptor.name,
                        outlet.descriptor.kind,
                        inlet.descriptor.kind
                    );
                    continue;
                }

                edges.push(Edge {
                    from: self.id,
                    from_port: outlet.descriptor.clone(),
                    to: target.id,
                    to_port: inlet.descriptor.clone(),
                });
            }
        }

        let edges: Rc<[Edge]> = edges.into();
        *self.cached_edges.borrow_mut() = Some(Rc::clone(&edges));
        edges
    }
}

impl std::fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("inlets", &self.inlets)
            .field("outlets", &self.outlets)
            .field("position", &self.position.get())
            .finish()
    }
}
