// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sample nodes and an in-memory store for unit tests.

use crate::binding::{InstanceId, LinkBinding};
use crate::discovery::{PortDeclarations, WiringNode};
use crate::event::OutletEvent;
use crate::store::{
    BindingStore, NodeInstance, NodeInstanceSource, Position, PositionStore, StoreError,
};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Float source with a bool inlet and a void outlet
#[derive(Debug, Default)]
pub struct Oscillator {
    pub enabled: bool,
    pub value: OutletEvent<f32>,
    pub wrapped: OutletEvent<()>,
}

impl WiringNode for Oscillator {
    fn type_name(&self) -> &'static str {
        "Oscillator"
    }

    fn declare_ports(&self, ports: &mut PortDeclarations) {
        ports
            .inlet_property("enabled", |n: &mut Oscillator, v: bool| n.enabled = v)
            .outlet("value", &self.value)
            .outlet("wrapped", &self.wrapped);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Two float inlets and a trigger
#[derive(Debug, Default)]
pub struct Mixer {
    pub amount: f32,
    pub modulation: f32,
    pub bangs: u32,
    pub mixed: OutletEvent<f32>,
}

impl WiringNode for Mixer {
    fn type_name(&self) -> &'static str {
        "Mixer"
    }

    fn declare_ports(&self, ports: &mut PortDeclarations) {
        ports
            .inlet_property("amount", |n: &mut Mixer, v: f32| n.amount = v)
            .inlet_property("modulation", |n: &mut Mixer, v: f32| n.modulation = v)
            .inlet_trigger("bang", |n: &mut Mixer| n.bangs += 1)
            .outlet("mixed", &self.mixed);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Integer accumulator
#[derive(Debug, Default)]
pub struct Counter {
    pub total: i32,
    pub scale: f32,
    pub total_event: OutletEvent<i32>,
}

impl WiringNode for Counter {
    fn type_name(&self) -> &'static str {
        "Counter"
    }

    fn declare_ports(&self, ports: &mut PortDeclarations) {
        ports
            .inlet_method("count", |n: &mut Counter, v: i32| n.total += v)
            .inlet_trigger("reset", |n: &mut Counter| n.total = 0)
            .inlet_property("scale", |n: &mut Counter, v: f32| n.scale = v)
            .outlet("total", &self.total_event);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Wrap a node in a fresh instance record
pub fn instance<N: WiringNode>(name: &str, node: N) -> NodeInstance {
    NodeInstance::new(InstanceId::new(), name, Rc::new(RefCell::new(node)))
}

/// In-memory host store
#[derive(Debug, Default)]
pub struct TestStore {
    pub nodes: Vec<NodeInstance>,
    pub positions: HashMap<InstanceId, Position>,
    pub bindings: HashMap<(InstanceId, String), Vec<LinkBinding>>,
    pub fail_writes: bool,
}

impl TestStore {
    /// Add a node, returning its identity
    pub fn add<N: WiringNode>(&mut self, name: &str, node: N) -> InstanceId {
        let instance = instance(name, node);
        let id = instance.id;
        self.nodes.push(instance);
        id
    }

    /// Forget every binding of a node
    pub fn clear_bindings(&mut self, node: InstanceId) {
        self.bindings.retain(|(id, _), _| *id != node);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("read-only".to_string()));
        }
        Ok(())
    }
}

impl NodeInstanceSource for TestStore {
    fn enumerate_nodes(&self) -> Vec<NodeInstance> {
        self.nodes.clone()
    }

    fn destroy_node(&mut self, node: InstanceId) -> Result<(), StoreError> {
        self.check_writable()?;
        let count = self.nodes.len();
        self.nodes.retain(|n| n.id != node);
        if self.nodes.len() == count {
            return Err(StoreError::UnknownNode(node));
        }
        self.positions.remove(&node);
        self.clear_bindings(node);
        Ok(())
    }
}

impl PositionStore for TestStore {
    fn position(&self, node: InstanceId) -> Option<Position> {
        self.positions.get(&node).copied()
    }

    fn set_position(&mut self, node: InstanceId, position: Position) -> Result<(), StoreError> {
        self.check_writable()?;
        self.positions.insert(node, position);
        Ok(())
    }
}

impl BindingStore for TestStore {
    fn bindings(&self, node: InstanceId, outlet: &str) -> Vec<LinkBinding> {
        self.bindings
            .get(&(node, outlet.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn append_binding(&mut self, node: InstanceId, binding: LinkBinding) -> Result<(), StoreError> {
        self.check_writable()?;
        self.bindings
            .entry((node, binding.source_port.clone()))
            .or_default()
            .push(binding);
        Ok(())
    }

    fn remove_binding(
        &mut self,
        node: InstanceId,
        outlet: &str,
        index: usize,
    ) -> Result<LinkBinding, StoreError> {
        self.check_writable()?;
        let list = self
            .bindings
            .get_mut(&(node, outlet.to_string()))
            .filter(|list| index < list.len())
            .ok_or_else(|| StoreError::BindingOutOfRange {
                node,
                outlet: outlet.to_string(),
                index,
            })?;
        Ok(list.remove(index))
    }
}
