// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outlet event sinks.
//!
//! A node holds one [`OutletEvent`] per outlet and fires it when it produces a
//! value. The graph installs [`Invoker`]s into the shared [`EventSink`] behind
//! it (see [`Graph::arm_outlets`](crate::Graph::arm_outlets)).

use crate::matcher::Invoker;
use crate::value::{Value, ValueKind};
use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

/// Type-erased listener list shared between a node and its graph
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    listeners: Rc<RefCell<Vec<Invoker>>>,
}

impl EventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener
    pub fn add_listener(&self, invoker: Invoker) {
        self.listeners.borrow_mut().push(invoker);
    }

    /// Remove all listeners
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Number of installed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver a value to every listener in installation order
    pub fn dispatch(&self, value: Value) {
        // Listeners may re-arm the sink while we iterate.
        let listeners = self.listeners.borrow().clone();
        for invoker in &listeners {
            invoker.call(value);
        }
    }

    /// Check whether two handles share the same listener list
    pub fn same_sink(&self, other: &EventSink) -> bool {
        Rc::ptr_eq(&self.listeners, &other.listeners)
    }
}

/// Typed outlet event held as a field by a node
pub struct OutletEvent<T> {
    sink: EventSink,
    _marker: PhantomData<fn(T)>,
}

impl<T: 'static> OutletEvent<T> {
    /// Create an outlet event with no listeners
    pub fn new() -> Self {
        Self {
            sink: EventSink::new(),
            _marker: PhantomData,
        }
    }

    /// Kind carried by this outlet, if `T` is a supported kind
    pub fn kind(&self) -> Option<ValueKind> {
        ValueKind::of::<T>()
    }

    /// Fire the outlet
    pub fn invoke(&self, value: T) {
        match Value::from_any(&value as &dyn Any) {
            Some(value) => self.sink.dispatch(value),
            None => tracing::warn!(
                "Outlet of unsupported type {} fired",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Shared sink handle
    pub fn sink(&self) -> &EventSink {
        &self.sink
    }
}

impl OutletEvent<()> {
    /// Fire a void outlet
    pub fn bang(&self) {
        self.sink.dispatch(Value::Void);
    }
}

impl<T: 'static> Default for OutletEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for OutletEvent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutletEvent")
            .field("type", &std::any::type_name::<T>())
            .field("sink", &self.sink)
            .finish()
    }
}
