// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outlet/inlet compatibility and invoker synthesis.

use crate::discovery::{InletCallable, WiringNode};
use crate::settings::MatchRules;
use crate::value::{Value, ValueKind};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// How an invoker shapes the outlet's value for the inlet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adapter {
    /// Kinds match; forward the value
    PassThrough(ValueKind),
    /// Void inlet; drop the value
    Discard,
    /// Outlet supplies nothing; call with a fixed default
    SupplyDefault(Value),
}

impl Adapter {
    /// Argument to pass for a dispatched value
    pub fn adapt(&self, value: Value) -> Value {
        match *self {
            Self::PassThrough(kind) if value.kind() == kind => value,
            Self::PassThrough(kind) => kind.default_value(),
            Self::Discard => Value::Void,
            Self::SupplyDefault(default) => default,
        }
    }
}

/// Callable that delivers an outlet's value to one inlet of one node
#[derive(Clone)]
pub struct Invoker {
    target: Weak<RefCell<dyn WiringNode>>,
    callable: InletCallable,
    adapter: Adapter,
}

impl Invoker {
    /// Adapter in use
    pub fn adapter(&self) -> Adapter {
        self.adapter
    }

    /// Deliver a value
    pub fn call(&self, value: Value) {
        let Some(target) = self.target.upgrade() else {
            tracing::warn!("Dropping {} value: target node no longer exists", value.kind());
            return;
        };

        let Ok(mut node) = target.try_borrow_mut() else {
            tracing::warn!("Dropping {} value: target node is already firing", value.kind());
            return;
        };

        (self.callable)(node.as_any_mut(), self.adapter.adapt(value));
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("adapter", &self.adapter)
            .field("target_alive", &(self.target.strong_count() > 0))
            .finish()
    }
}

/// Decides which outlet kinds may drive which inlet kinds
#[derive(Debug, Clone, Default)]
pub struct TypeMatcher {
    rules: MatchRules,
}

impl TypeMatcher {
    /// Create a matcher with the given rules
    pub fn new(rules: MatchRules) -> Self {
        Self { rules }
    }

    /// Check if an outlet of `outlet` kind may bind to an inlet of `inlet` kind
    pub fn can_bind(&self, outlet: ValueKind, inlet: ValueKind) -> bool {
        self.adapter_for(outlet, inlet).is_some()
    }

    /// Dispatch table entry for a pair of kinds
    pub fn adapter_for(&self, outlet: ValueKind, inlet: ValueKind) -> Option<Adapter> {
        match (outlet, inlet) {
            (_, ValueKind::Void) => Some(Adapter::Discard),
            (o, i) if o == i => Some(Adapter::PassThrough(i)),
            (ValueKind::Void, i) if self.rules.void_outlet_supplies_defaults => {
                Some(Adapter::SupplyDefault(i.default_value()))
            }
            _ => None,
        }
    }

    /// Build the invoker for a compatible pair of kinds
    pub fn synthesize_invoker(
        &self,
        outlet: ValueKind,
        inlet: ValueKind,
        target: &Rc<RefCell<dyn WiringNode>>,
        callable: InletCallable,
    ) -> Option<Invoker> {
        let adapter = self.adapter_for(outlet, inlet)?;
        Some(Invoker {
            target: Rc::downgrade(target),
            callable,
            adapter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{discover, NodeHandle};
    use crate::testing::Mixer;

    #[test]
    fn test_minimal_rules() {
        let matcher = TypeMatcher::default();
        assert!(matcher.can_bind(ValueKind::Float, ValueKind::Float));
        assert!(matcher.can_bind(ValueKind::Float, ValueKind::Void));
        assert!(matcher.can_bind(ValueKind::Void, ValueKind::Void));
        assert!(!matcher.can_bind(ValueKind::Int, ValueKind::Bool));
        assert!(!matcher.can_bind(ValueKind::Void, ValueKind::Float));
        assert!(!matcher.can_bind(ValueKind::Int, ValueKind::Float));

        for outlet in ValueKind::ALL {
            for inlet in ValueKind::ALL {
                let expected = outlet == inlet || inlet == ValueKind::Void;
                assert_eq!(matcher.can_bind(outlet, inlet), expected, "{outlet} -> {inlet}");
            }
        }
    }

    #[test]
    fn test_void_outlet_defaults_rule() {
        let matcher = TypeMatcher::new(MatchRules {
            void_outlet_supplies_defaults: true,
        });
        assert_eq!(
            matcher.adapter_for(ValueKind::Void, ValueKind::Int),
            Some(Adapter::SupplyDefault(Value::Int(0)))
        );
        assert_eq!(
            matcher.adapter_for(ValueKind::Void, ValueKind::Bool),
            Some(Adapter::SupplyDefault(Value::Bool(false)))
        );
        assert!(!matcher.can_bind(ValueKind::Bool, ValueKind::Float));
    }

    #[test]
    fn test_adapter_policy() {
        assert_eq!(Adapter::Discard.adapt(Value::Float(3.0)), Value::Void);
        assert_eq!(
            Adapter::PassThrough(ValueKind::Float).adapt(Value::Float(3.0)),
            Value::Float(3.0)
        );
        assert_eq!(
            Adapter::PassThrough(ValueKind::Float).adapt(Value::Void),
            Value::Float(0.0)
        );
    }

    #[test]
    fn test_invoker_calls_target() {
        let mixer = Rc::new(RefCell::new(Mixer::default()));
        let handle: NodeHandle = mixer.clone();
        let ports = discover(&*handle.borrow());

        let matcher = TypeMatcher::default();
        let amount = matcher
            .synthesize_invoker(
                ValueKind::Float,
                ValueKind::Float,
                &handle,
                ports.inlets[0].callable().clone(),
            )
            .unwrap();
        let bang = matcher
            .synthesize_invoker(
                ValueKind::Float,
                ValueKind::Void,
                &handle,
                ports.inlets[2].callable().clone(),
            )
            .unwrap();

        amount.call(Value::Float(0.5));
        bang.call(Value::Float(0.5));

        assert_eq!(mixer.borrow().amount, 0.5);
        assert_eq!(mixer.borrow().bangs, 1);

        assert!(matcher
            .synthesize_invoker(
                ValueKind::Int,
                ValueKind::Float,
                &handle,
                ports.inlets[0].callable().clone(),
            )
            .is_none());
    }

    #[test]
    fn test_invoker_survives_dropped_target() {
        let handle: NodeHandle = Rc::new(RefCell::new(Mixer::default()));
        let callable = discover(&*handle.borrow()).inlets[0].callable().clone();
        let invoker = TypeMatcher::default()
            .synthesize_invoker(ValueKind::Float, ValueKind::Float, &handle, callable)
            .unwrap();

        drop(handle);
        invoker.call(Value::Float(1.0));
    }
}
