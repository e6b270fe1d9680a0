// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted link bindings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Create a new random instance ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The durable, name-based record of one link.
///
/// Stored per outlet by the [`BindingStore`](crate::store::BindingStore). A
/// binding whose target no longer exists is simply ignored when edges are
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkBinding {
    /// Outlet name on the source node
    pub source_port: String,
    /// Target node identity
    pub target: InstanceId,
    /// Inlet name on the target node
    pub target_port: String,
}

impl LinkBinding {
    /// Create a new binding
    pub fn new(
        source_port: impl Into<String>,
        target: InstanceId,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source_port: source_port.into(),
            target,
            target_port: target_port.into(),
        }
    }

    /// Check if this binding points at the given inlet
    pub fn targets(&self, target: InstanceId, target_port: &str) -> bool {
        self.target == target && self.target_port == target_port
    }
}
