// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patch graph model for `Patchwire`.
//!
//! This crate provides the topology core of a dataflow patch editor:
//! - Port discovery from per-type declarations
//! - Typed outlet -> inlet links with a closed set of value kinds
//! - Edge lists derived lazily from host-persisted bindings
//! - The two-click wiring gesture
//!
//! ## Architecture
//!
//! The host owns all persisted state behind three narrow traits
//! ([`NodeInstanceSource`], [`PositionStore`], [`BindingStore`]). A [`Graph`]
//! wraps each enumerated node in a [`GraphNode`] and resolves the bindings it
//! reads from the store into [`Edge`]s, caching them per node until a link
//! mutation, node removal or rescan invalidates the cache. Nodes refer to one
//! another only through [`InstanceId`]s resolved by the graph.

pub mod binding;
pub mod discovery;
pub mod event;
pub mod graph;
pub mod matcher;
pub mod node;
pub mod port;
pub mod registry;
pub mod session;
pub mod settings;
pub mod store;
pub mod value;

#[cfg(test)]
mod testing;

pub use binding::{InstanceId, LinkBinding};
pub use discovery::{
    discover, DiscoveredPorts, Inlet, NodeHandle, Outlet, PortDeclarations, WiringNode,
};
pub use event::{EventSink, OutletEvent};
pub use graph::{Graph, GraphError, LinkError};
pub use matcher::{Adapter, Invoker, TypeMatcher};
pub use node::{Edge, GraphNode};
pub use port::{PortDescriptor, PortDirection};
pub use registry::{NodeRegistry, NodeType};
pub use session::{PortRef, WiringEvent, WiringOutcome, WiringSession, WiringState};
pub use settings::{FallbackLayout, MatchRules, SettingsError, WiringSettings};
pub use store::{
    BindingStore, NodeInstance, NodeInstanceSource, Position, PositionStore, StoreError,
};
pub use value::{Value, ValueKind};
