// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory patch scene for `Patchwire`.
//!
//! This crate provides a host for [`patchwire_graph`]:
//! - Node instances with stable identities
//! - Persisted positions and per-outlet bindings
//! - Snapshot-based undo/redo of that state
//! - RON patch documents
//!
//! ## Usage
//!
//! A [`Scene`] implements all three store traits, so it can back a
//! [`Graph`](patchwire_graph::Graph) directly. Undo and redo change bindings
//! behind the graph's back; call
//! [`Graph::rescan_from_source`](patchwire_graph::Graph::rescan_from_source)
//! afterwards.

pub mod document;
pub mod history;
pub mod scene;

#[cfg(test)]
mod fixtures;

pub use document::{NodeRecord, PatchDocument, DOCUMENT_VERSION};
pub use history::{History, HistoryError, Operation, StateSnapshot};
pub use scene::{OutletBindings, PersistedState, Scene, SceneError};
