//! Circuit graph representation and value propagation.
//!
//! This module provides the [`Circuit`] session: the [`NodeRegistry`] of
//! shared connection points, the component arena, and the propagation
//! machinery that keeps node values consistent after every edit.

mod config;
mod graph;
mod layout;
mod lookup;
mod propagate;
mod registry;
mod summary;
mod types;

pub use config::{CircuitConfig, DEFAULT_EPSILON, DEFAULT_MAX_EVALUATIONS};
pub use graph::Circuit;
pub use layout::{LayoutDocument, LayoutRecord, DEFAULT_CLOCK_INTERVAL_MS};
pub use registry::{Node, NodeRegistry};
pub use types::*;
