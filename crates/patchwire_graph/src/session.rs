// SPDX-License-Identifier: MIT OR Apache-2.0
//! Two-click wiring gesture.
//!
//! The view reports port clicks as [`WiringEvent`]s. The first click picks a
//! port, the second click on a port of the other direction commits the link,
//! and every completed gesture returns the session to [`WiringState::Idle`].

use crate::binding::InstanceId;
use crate::graph::{Graph, LinkError};
use crate::node::Edge;
use crate::port::PortDirection;
use crate::store::{BindingStore, NodeInstanceSource, PositionStore};
use std::collections::VecDeque;

/// A named port on a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    /// Node identity
    pub node: InstanceId,
    /// Port name
    pub port: String,
}

impl PortRef {
    /// Create a port reference
    pub fn new(node: InstanceId, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
        }
    }
}

/// Wiring gesture state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WiringState {
    /// No gesture in progress
    #[default]
    Idle,
    /// An outlet was picked; waiting for an inlet
    PendingFromOutlet(PortRef),
    /// An inlet was picked; waiting for an outlet
    PendingFromInlet(PortRef),
}

impl WiringState {
    /// Direction of the pending port, if any
    pub fn pending_direction(&self) -> Option<PortDirection> {
        match self {
            Self::Idle => None,
            Self::PendingFromOutlet(_) => Some(PortDirection::Outlet),
            Self::PendingFromInlet(_) => Some(PortDirection::Inlet),
        }
    }

    /// The pending port, if any
    pub fn pending_port(&self) -> Option<&PortRef> {
        match self {
            Self::Idle => None,
            Self::PendingFromOutlet(port) | Self::PendingFromInlet(port) => Some(port),
        }
    }
}

/// UI input reported to the session
#[derive(Debug, Clone, PartialEq)]
pub enum WiringEvent {
    /// An outlet button was pressed
    OutletClicked(PortRef),
    /// An inlet button was pressed
    InletClicked(PortRef),
    /// The gesture was cancelled (escape, click on empty space)
    Cancel,
    /// The user asked to delete a node
    DeleteNode(InstanceId),
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum WiringOutcome {
    /// First port picked
    Pending,
    /// A link was created
    Linked(Edge),
    /// The link was refused; the gesture ended anyway
    Rejected(LinkError),
    /// The gesture ended without a link
    Cancelled,
    /// Nothing was in progress
    Ignored,
    /// A node was deleted along with its links
    NodeDeleted(InstanceId),
}

/// Wiring gesture state machine plus the queue of pending UI events
#[derive(Debug, Default)]
pub struct WiringSession {
    state: WiringState,
    queue: VecDeque<WiringEvent>,
}

impl WiringSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &WiringState {
        &self.state
    }

    /// Check if a gesture is in progress
    pub fn is_wiring(&self) -> bool {
        self.state != WiringState::Idle
    }

    /// Queue an event for the next [`process`](Self::process) call
    pub fn enqueue(&mut self, event: WiringEvent) {
        self.queue.push_back(event);
    }

    /// Handle all queued events in order
    pub fn process<S>(&mut self, graph: &mut Graph<S>) -> Vec<WiringOutcome>
    where
        S: NodeInstanceSource + PositionStore + BindingStore,
    {
        let mut outcomes = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop_front() {
            outcomes.push(self.handle(graph, event));
        }
        outcomes
    }

    /// Handle one event.
    ///
    /// `DeleteNode` destroys the instance in the host as well, so it stays gone
    /// after a rescan.
    pub fn handle<S>(&mut self, graph: &mut Graph<S>, event: WiringEvent) -> WiringOutcome
    where
        S: NodeInstanceSource + PositionStore + BindingStore,
    {
        match event {
            WiringEvent::OutletClicked(port) => self.outlet_clicked(graph, port),
            WiringEvent::InletClicked(port) => self.inlet_clicked(graph, port),
            WiringEvent::Cancel => self.cancel(),
            WiringEvent::DeleteNode(node) => {
                self.state = WiringState::Idle;
                match graph.delete_node(node) {
                    Ok(_) => WiringOutcome::NodeDeleted(node),
                    Err(e) => WiringOutcome::Rejected(e),
                }
            }
        }
    }

    /// An outlet was clicked
    pub fn outlet_clicked<S>(&mut self, graph: &mut Graph<S>, port: PortRef) -> WiringOutcome
    where
        S: PositionStore + BindingStore,
    {
        match std::mem::take(&mut self.state) {
            WiringState::Idle => {
                self.state = WiringState::PendingFromOutlet(port);
                WiringOutcome::Pending
            }
            WiringState::PendingFromInlet(inlet) => Self::commit(graph, &port, &inlet),
            WiringState::PendingFromOutlet(_) => WiringOutcome::Cancelled,
        }
    }

    /// An inlet was clicked
    pub fn inlet_clicked<S>(&mut self, graph: &mut Graph<S>, port: PortRef) -> WiringOutcome
    where
        S: PositionStore + BindingStore,
    {
        match std::mem::take(&mut self.state) {
            WiringState::Idle => {
                self.state = WiringState::PendingFromInlet(port);
                WiringOutcome::Pending
            }
            WiringState::PendingFromOutlet(outlet) => Self::commit(graph, &outlet, &port),
            WiringState::PendingFromInlet(_) => WiringOutcome::Cancelled,
        }
    }

    /// Abandon the gesture
    pub fn cancel(&mut self) -> WiringOutcome {
        match std::mem::take(&mut self.state) {
            WiringState::Idle => WiringOutcome::Ignored,
            _ => WiringOutcome::Cancelled,
        }
    }

    fn commit<S>(graph: &mut Graph<S>, outlet: &PortRef, inlet: &PortRef) -> WiringOutcome
    where
        S: PositionStore + BindingStore,
    {
        match graph.create_link(outlet.node, &outlet.port, inlet.node, &inlet.port) {
            Ok(edge) => WiringOutcome::Linked(edge),
            Err(e) => {
                tracing::debug!("Wiring gesture rejected: {}", e);
                WiringOutcome::Rejected(e)
            }
        }
    }
}
