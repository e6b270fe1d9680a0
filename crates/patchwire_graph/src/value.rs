// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar value kinds carried by ports.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;

/// Kind of value a port carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// No value (trigger / bang)
    Void,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
}

impl ValueKind {
    /// All kinds, in dispatch table order
    pub const ALL: [ValueKind; 4] = [Self::Void, Self::Bool, Self::Int, Self::Float];

    /// Infer the kind for a Rust type.
    ///
    /// Returns `None` for any type outside the closed set
    /// (`()`, `bool`, `i32`, `f32`).
    pub fn of<T: 'static>() -> Option<Self> {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<()>() {
            Some(Self::Void)
        } else if id == TypeId::of::<bool>() {
            Some(Self::Bool)
        } else if id == TypeId::of::<i32>() {
            Some(Self::Int)
        } else if id == TypeId::of::<f32>() {
            Some(Self::Float)
        } else {
            None
        }
    }

    /// Default argument supplied when a caller has no value of this kind
    pub fn default_value(self) -> Value {
        match self {
            Self::Void => Value::Void,
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
        }
    }

    /// Get the color for this kind (for UI)
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Void => [200, 200, 200],
            Self::Bool => [200, 80, 80],
            Self::Int => [80, 200, 200],
            Self::Float => [80, 200, 80],
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        };
        f.write_str(name)
    }
}

/// A value flowing from an outlet to an inlet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value
    Void,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
}

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Void => ValueKind::Void,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
        }
    }

    /// Convert a type-erased Rust value, if its type is one of the four kinds
    pub fn from_any(value: &dyn Any) -> Option<Self> {
        if value.is::<()>() {
            Some(Self::Void)
        } else if let Some(v) = value.downcast_ref::<bool>() {
            Some(Self::Bool(*v))
        } else if let Some(v) = value.downcast_ref::<i32>() {
            Some(Self::Int(*v))
        } else {
            value.downcast_ref::<f32>().map(|v| Self::Float(*v))
        }
    }

    /// Box the payload as its native Rust type
    pub(crate) fn into_any(self) -> Box<dyn Any> {
        match self {
            Self::Void => Box::new(()),
            Self::Bool(v) => Box::new(v),
            Self::Int(v) => Box::new(v),
            Self::Float(v) => Box::new(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_inference() {
        assert_eq!(ValueKind::of::<()>(), Some(ValueKind::Void));
        assert_eq!(ValueKind::of::<bool>(), Some(ValueKind::Bool));
        assert_eq!(ValueKind::of::<i32>(), Some(ValueKind::Int));
        assert_eq!(ValueKind::of::<f32>(), Some(ValueKind::Float));
        assert_eq!(ValueKind::of::<f64>(), None);
        assert_eq!(ValueKind::of::<String>(), None);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(ValueKind::Bool.default_value(), Value::Bool(false));
        assert_eq!(ValueKind::Int.default_value(), Value::Int(0));
        assert_eq!(ValueKind::Float.default_value(), Value::Float(0.0));
        for kind in ValueKind::ALL {
            assert_eq!(kind.default_value().kind(), kind);
        }
    }

    #[test]
    fn test_from_any() {
        assert_eq!(Value::from_any(&2.5f32), Some(Value::Float(2.5)));
        assert_eq!(Value::from_any(&()), Some(Value::Void));
        assert_eq!(Value::from_any(&7u8), None);
        let boxed = Value::Int(3).into_any();
        assert_eq!(boxed.downcast_ref::<i32>(), Some(&3));
    }
}
