// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port descriptors for node inlets/outlets.

use crate::value::ValueKind;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Inlet,
    /// Output port
    Outlet,
}

impl PortDirection {
    /// The direction a link endpoint on this side must pair with
    pub fn opposite(self) -> Self {
        match self {
            Self::Inlet => Self::Outlet,
            Self::Outlet => Self::Inlet,
        }
    }
}

/// Immutable description of one inlet or outlet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Port name, unique per direction within a node
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Kind of value carried
    pub kind: ValueKind,
    /// Port direction
    pub direction: PortDirection,
    /// Inlet backed by a callable rather than a property setter
    pub method_form: bool,
}

impl PortDescriptor {
    /// Create an inlet descriptor
    pub fn inlet(name: impl Into<String>, kind: ValueKind, method_form: bool) -> Self {
        let name = name.into();
        Self {
            display_name: nicify_name(&name),
            name,
            kind,
            direction: PortDirection::Inlet,
            method_form,
        }
    }

    /// Create an outlet descriptor
    pub fn outlet(name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        Self {
            display_name: nicify_name(&name),
            name,
            kind,
            direction: PortDirection::Outlet,
            method_form: false,
        }
    }

    /// Check if this is an inlet
    pub fn is_inlet(&self) -> bool {
        self.direction == PortDirection::Inlet
    }
}

/// Turn a member name into a display label.
///
/// `_floatEvent` becomes "Float Event", `m_modulation_value` becomes
/// "Modulation Value".
pub fn nicify_name(name: &str) -> String {
    let trimmed = name.strip_prefix("m_").unwrap_or(name);
    let trimmed = trimmed.trim_start_matches('_');

    let mut out = String::with_capacity(trimmed.len() + 4);
    let mut prev: Option<char> = None;
    let mut capitalize = true;

    for c in trimmed.chars() {
        if c == '_' || c == ' ' {
            capitalize = true;
            prev = Some(' ');
            continue;
        }

        let boundary = match prev {
            Some(p) if p != ' ' => {
                (c.is_uppercase() && !p.is_uppercase())
                    || (c.is_ascii_digit() && !p.is_ascii_digit())
            }
            _ => false,
        };

        if (boundary || capitalize) && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }

        if capitalize || out.is_empty() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }

        capitalize = false;
        prev = Some(c);
    }

    out
}
