// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port discovery.
//!
//! Node types describe their ports by implementing [`WiringNode::declare_ports`].
//! Discovery replays those declarations into ordered inlet and outlet tables,
//! inferring each port's [`ValueKind`] from the Rust type it was declared with.
//! Declarations that do not map to a supported kind are skipped.

use crate::event::{EventSink, OutletEvent};
use crate::port::PortDescriptor;
use crate::value::{Value, ValueKind};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a node instance
pub type NodeHandle = Rc<RefCell<dyn WiringNode>>;

/// Type-erased inlet entry point: receives the node and the argument
pub type InletCallable = Rc<dyn Fn(&mut dyn Any, Value)>;

/// A processing unit that can be placed in a patch
pub trait WiringNode: Any {
    /// Type name shown in node titles and used to recreate instances
    fn type_name(&self) -> &'static str;

    /// Declare inlets and outlets in a stable order
    fn declare_ports(&self, ports: &mut PortDeclarations);

    /// Access the concrete node for inlet dispatch
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A discovered inlet: descriptor plus its entry point
#[derive(Clone)]
pub struct Inlet {
    /// Port description
    pub descriptor: PortDescriptor,
    callable: InletCallable,
}

impl Inlet {
    /// Entry point used by invokers
    pub fn callable(&self) -> &InletCallable {
        &self.callable
    }
}

impl std::fmt::Debug for Inlet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inlet").field("descriptor", &self.descriptor).finish()
    }
}

/// A discovered outlet: descriptor plus the node's event sink
#[derive(Debug, Clone)]
pub struct Outlet {
    /// Port description
    pub descriptor: PortDescriptor,
    /// Runtime sink the node fires into
    pub sink: EventSink,
}

/// Collects port declarations from a node
#[derive(Debug, Default)]
pub struct PortDeclarations {
    inlets: Vec<Inlet>,
    outlets: Vec<Outlet>,
}

impl PortDeclarations {
    /// Create an empty declaration table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an inlet backed by a method taking one argument (`()` for none)
    pub fn inlet_method<N, T, F>(&mut self, name: &str, method: F) -> &mut Self
    where
        N: 'static,
        T: 'static,
        F: Fn(&mut N, T) + 'static,
    {
        self.push_inlet::<N, T, F>(name, method, true)
    }

    /// Declare a zero-argument trigger inlet
    pub fn inlet_trigger<N, F>(&mut self, name: &str, method: F) -> &mut Self
    where
        N: 'static,
        F: Fn(&mut N) + 'static,
    {
        self.push_inlet::<N, (), _>(name, move |node: &mut N, ()| method(node), true)
    }

    /// Declare an inlet backed by a property setter
    pub fn inlet_property<N, T, F>(&mut self, name: &str, setter: F) -> &mut Self
    where
        N: 'static,
        T: 'static,
        F: Fn(&mut N, T) + 'static,
    {
        self.push_inlet::<N, T, F>(name, setter, false)
    }

    /// Declare an outlet backed by an event field
    pub fn outlet<T: 'static>(&mut self, name: &str, event: &OutletEvent<T>) -> &mut Self {
        let Some(kind) = ValueKind::of::<T>() else {
            tracing::debug!(
                "Skipping outlet '{}': unsupported type {}",
                name,
                std::any::type_name::<T>()
            );
            return self;
        };

        if self.outlets.iter().any(|o| o.descriptor.name == name) {
            tracing::debug!("Skipping duplicate outlet '{}'", name);
            return self;
        }

        self.outlets.push(Outlet {
            descriptor: PortDescriptor::outlet(name, kind),
            sink: event.sink().clone(),
        });
        self
    }

    fn push_inlet<N, T, F>(&mut self, name: &str, method: F, method_form: bool) -> &mut Self
    where
        N: 'static,
        T: 'static,
        F: Fn(&mut N, T) + 'static,
    {
        let Some(kind) = ValueKind::of::<T>() else {
            tracing::debug!(
                "Skipping inlet '{}': unsupported type {}",
                name,
                std::any::type_name::<T>()
            );
            return self;
        };

        if self.inlets.iter().any(|i| i.descriptor.name == name) {
            tracing::debug!("Skipping duplicate inlet '{}'", name);
            return self;
        }

        let port = name.to_string();
        let callable: InletCallable = Rc::new(move |node: &mut dyn Any, value: Value| {
            let Some(node) = node.downcast_mut::<N>() else {
                tracing::warn!("Inlet '{}' called on a node of another type", port);
                return;
            };
            match value.into_any().downcast::<T>() {
                Ok(arg) => method(node, *arg),
                Err(_) => tracing::warn!("Inlet '{}' received a {} value", port, value.kind()),
            }
        });

        self.inlets.push(Inlet {
            descriptor: PortDescriptor::inlet(name, kind, method_form),
            callable,
        });
        self
    }

    /// Finish collecting
    pub fn finish(self) -> DiscoveredPorts {
        DiscoveredPorts {
            inlets: self.inlets,
            outlets: self.outlets,
        }
    }
}

/// Result of discovering one node
#[derive(Debug, Clone, Default)]
pub struct DiscoveredPorts {
    /// Inlets in declaration order
    pub inlets: Vec<Inlet>,
    /// Outlets in declaration order
    pub outlets: Vec<Outlet>,
}

impl DiscoveredPorts {
    /// Inlet descriptors in order
    pub fn inlet_descriptors(&self) -> impl Iterator<Item = &PortDescriptor> {
        self.inlets.iter().map(|i| &i.descriptor)
    }

    /// Outlet descriptors in order
    pub fn outlet_descriptors(&self) -> impl Iterator<Item = &PortDescriptor> {
        self.outlets.iter().map(|o| &o.descriptor)
    }
}

/// Discover the ports of a node instance
pub fn discover(node: &dyn WiringNode) -> DiscoveredPorts {
    let mut ports = PortDeclarations::new();
    node.declare_ports(&mut ports);
    ports.finish()
}
