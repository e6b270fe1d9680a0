// SPDX-License-Identifier: MIT OR Apache-2.0
//! RON patch documents.
//!
//! A document records each node's identity, name, type, position and
//! bindings. Loading recreates instances through a [`NodeRegistry`] and keeps
//! their identities, so bindings resolve again after a reload.

use crate::scene::{OutletBindings, Scene, SceneError};
use patchwire_graph::{InstanceId, NodeRegistry, Position};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

fn default_position() -> Position {
    Position::UNINITIALIZED
}

/// One node in a patch document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Instance identity
    pub id: InstanceId,
    /// Instance name
    pub name: String,
    /// Node type name
    pub type_name: String,
    /// Position, or the uninitialized sentinel
    #[serde(default = "default_position")]
    pub position: Position,
    /// Bindings per outlet
    #[serde(default)]
    pub bindings: OutletBindings,
}

/// Serialized patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchDocument {
    /// Format version
    pub version: u32,
    /// Patch name
    pub name: String,
    /// Nodes in enumeration order
    pub nodes: Vec<NodeRecord>,
}

impl PatchDocument {
    /// Capture a scene
    pub fn from_scene(scene: &Scene) -> Self {
        let state = scene.state();
        let nodes = scene
            .enumerate()
            .map(|(id, name, type_name)| NodeRecord {
                id,
                name: name.to_string(),
                type_name: type_name.to_string(),
                position: state
                    .positions
                    .get(&id)
                    .copied()
                    .unwrap_or(Position::UNINITIALIZED),
                bindings: state.bindings.get(&id).cloned().unwrap_or_default(),
            })
            .collect();

        Self {
            version: DOCUMENT_VERSION,
            name: scene.name().to_string(),
            nodes,
        }
    }

    /// Recreate a scene. Nodes of unknown types are skipped; bindings that
    /// pointed at them are kept and resolve to nothing.
    pub fn into_scene(self, registry: &NodeRegistry) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(self.name);
        let mut restored = Vec::with_capacity(self.nodes.len());

        for record in self.nodes {
            let Some(node) = registry.create(&record.type_name) else {
                tracing::warn!(
                    "Skipping node '{}': unknown type '{}'",
                    record.name,
                    record.type_name
                );
                continue;
            };

            scene.insert_node(record.id, record.name, node)?;
            restored.push((record.id, record.position, record.bindings));
        }

        let mut state = scene.state().clone();
        for (id, position, bindings) in restored {
            state.positions.insert(id, position);
            if !bindings.is_empty() {
                state.bindings.insert(id, bindings);
            }
        }

        scene.restore_state(state);
        Ok(scene)
    }

    /// Render as pretty RON
    pub fn to_ron(&self) -> Result<String, SceneError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Parse from RON
    pub fn from_ron(s: &str) -> Result<Self, SceneError> {
        let document: Self = ron::from_str(s)?;
        if document.version > DOCUMENT_VERSION {
            tracing::warn!(
                "Patch document version {} is newer than supported version {}",
                document.version,
                DOCUMENT_VERSION
            );
        }
        Ok(document)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}
