// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wiring settings, persisted as RON.

use crate::store::Position;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placement of nodes that have never been positioned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackLayout {
    /// Nodes per row before wrapping back to the first column
    pub columns: usize,
    /// Horizontal step between columns
    pub spacing_x: f32,
    /// Vertical step between creation indices
    pub spacing_y: f32,
}

impl FallbackLayout {
    /// Position for the node created at `index`
    pub fn position_for(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        Position::new(
            ((index % columns) + 1) as f32 * self.spacing_x,
            (index + 1) as f32 * self.spacing_y,
        )
    }
}

impl Default for FallbackLayout {
    fn default() -> Self {
        Self {
            columns: 8,
            spacing_x: 50.0,
            spacing_y: 40.0,
        }
    }
}

/// Outlet/inlet compatibility options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Let a void outlet drive bool/int/float inlets with a default argument
    pub void_outlet_supplies_defaults: bool,
}

/// Settings for a wiring graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringSettings {
    /// Fallback node placement
    pub fallback_layout: FallbackLayout,
    /// Link compatibility rules
    pub match_rules: MatchRules,
}

/// Settings load/save error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

impl WiringSettings {
    /// Parse settings from RON text
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }

    /// Render settings as pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load wiring settings from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
