// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sample nodes for scene tests.

use patchwire_graph::{NodeHandle, NodeRegistry, OutletEvent, PortDeclarations, WiringNode};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Lfo {
    pub resets: u32,
    pub value: OutletEvent<f32>,
    pub tick: OutletEvent<()>,
}

impl WiringNode for Lfo {
    fn type_name(&self) -> &'static str {
        "Lfo"
    }

    fn declare_ports(&self, ports: &mut PortDeclarations) {
        ports
            .inlet_trigger("reset", |n: &mut Lfo| n.resets += 1)
            .outlet("value", &self.value)
            .outlet("tick", &self.tick);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct Gate {
    pub level: f32,
    pub open: bool,
    pub out: OutletEvent<f32>,
}

impl WiringNode for Gate {
    fn type_name(&self) -> &'static str {
        "Gate"
    }

    fn declare_ports(&self, ports: &mut PortDeclarations) {
        ports
            .inlet_property("level", |n: &mut Gate, v: f32| n.level = v)
            .inlet_trigger("open", |n: &mut Gate| n.open = true)
            .outlet("out", &self.out);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn handle<N: WiringNode>(node: N) -> NodeHandle {
    Rc::new(RefCell::new(node))
}

pub fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register("Generators/Lfo", Lfo::default);
    registry.register("Control/Gate", Gate::default);
    registry
}
