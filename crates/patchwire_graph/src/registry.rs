// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node types that can be created from the editor.

use crate::discovery::{NodeHandle, WiringNode};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

type Constructor = Box<dyn Fn() -> NodeHandle>;

/// A creatable node type
pub struct NodeType {
    /// Type name, as returned by [`WiringNode::type_name`]
    pub type_name: &'static str,
    /// Menu label, e.g. "Timing/Delay"
    pub label: String,
    constructor: Constructor,
}

impl NodeType {
    /// Menu category (label up to the last '/')
    pub fn category(&self) -> Option<&str> {
        self.label.rsplit_once('/').map(|(category, _)| category)
    }
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeType")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .finish()
    }
}

/// Registry of available node types
#[derive(Debug, Default)]
pub struct NodeRegistry {
    /// Registered node types by type name
    types: IndexMap<&'static str, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type under a menu label
    pub fn register<N, F>(&mut self, label: impl Into<String>, constructor: F)
    where
        N: WiringNode,
        F: Fn() -> N + 'static,
    {
        let type_name = constructor().type_name();
        let label = label.into();
        if self.types.contains_key(type_name) {
            tracing::warn!("Node type '{}' registered twice; keeping the latest", type_name);
        }

        self.types.insert(
            type_name,
            NodeType {
                type_name,
                label,
                constructor: Box::new(move || Rc::new(RefCell::new(constructor())) as NodeHandle),
            },
        );
    }

    /// Get a node type by type name
    pub fn get(&self, type_name: &str) -> Option<&NodeType> {
        self.types.get(type_name)
    }

    /// All registered types, in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Types whose label falls under a category
    pub fn types_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a NodeType> {
        self.types.values().filter(move |t| t.category() == Some(category))
    }

    /// Create a fresh instance of a type
    pub fn create(&self, type_name: &str) -> Option<NodeHandle> {
        self.get(type_name).map(|t| (t.constructor)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Counter, Mixer};

    #[test]
    fn test_register_and_create() {
        let mut registry = NodeRegistry::new();
        registry.register("Math/Mixer", Mixer::default);
        registry.register("Math/Counter", Counter::default);

        let names: Vec<_> = registry.types().map(|t| t.type_name).collect();
        assert_eq!(names, ["Mixer", "Counter"]);
        assert_eq!(registry.types_in_category("Math").count(), 2);
        assert_eq!(registry.get("Mixer").unwrap().category(), Some("Math"));

        let node = registry.create("Counter").unwrap();
        assert_eq!(node.borrow().type_name(), "Counter");
        assert!(registry.create("Delay").is_none());
    }
}
