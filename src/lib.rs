//! # ProtoEl Core
//!
//! Connection graph and voltage propagation engine for an interactive
//! circuit editor.
//!
//! This library provides:
//! - Deduplicated connection points shared between components
//! - Bidirectional value propagation through wires and switches
//! - Threshold-based logic on top of continuous node voltages
//! - Gates, a JK flip-flop, a seven-segment decoder and display
//! - Layout documents for saving and restoring a circuit
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Node registry, connection protocol and propagation
//! - [`components`] - Component models (sources, resistor, wire, switch, logic)
//! - [`error`] - Error type shared by every operation
//!
//! ## Usage
//!
//! ```
//! use protoel_core::{Circuit, Component, Point};
//!
//! let mut circuit = Circuit::new();
//! let source = circuit.add(Component::dc_voltage(5.0)?);
//! let wire = circuit.add(Component::wire());
//!
//! circuit.connect(source, &[Point::new(0, 0)])?;
//! circuit.connect(wire, &[Point::new(0, 0), Point::new(100, 0)])?;
//!
//! assert_eq!(circuit.node_value(Point::new(100, 0)), Some(5.0));
//! # Ok::<(), protoel_core::CircuitError>(())
//! ```
//!
//! ## Propagation Method
//!
//! There is no equation solving. When a component sets a node, every other
//! component on that node re-derives its value and may set further nodes:
//!
//! 1. Wires and closed switches copy whichever side changed to the other
//! 2. Logic elements republish their outputs when the computed bit changes
//! 3. Sources drive their node when attached or re-parameterised
//!
//! Notifications are processed from a queue inside the editing call that
//! caused them, so every public operation returns with the graph settled.

pub mod circuit;
pub mod components;
pub mod error;

// Re-export main types for convenience
pub use circuit::{Circuit, CircuitConfig, ComponentId, LayoutDocument, NodeId, Point};
pub use components::{Component, ComponentKind, GateKind, SwitchState};
pub use error::{CircuitError, Result};
