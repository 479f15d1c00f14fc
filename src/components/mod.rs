//! Component models for the connection graph.
//!
//! This module provides the state of every supported component kind:
//! - Sources: Ground, DC Voltage, Clock
//! - Linear: Resistor
//! - Pass-through: Wire, Switch
//! - Logic: AND, OR, XOR, NAND, NOR, XNOR, NOT
//! - Sequential: JK Flip-Flop
//! - Display: Decoder, Seven-Segment Display
//!
//! The models hold per-kind state only. Node attachment and propagation are
//! driven by [`Circuit`](crate::Circuit), which dispatches on [`Component`].

mod controls;
mod display;
mod linear;
mod logic;
mod sequential;
mod sources;

pub use controls::{values_equal, PassThrough, Switch, SwitchState, Transfer, Wire};
pub use display::{
    code_from_bits, digit_for, segments_for, Decoder, Display, DECODER_PINS, SEGMENTS,
    SEGMENT_NAMES,
};
pub use linear::Resistor;
pub use logic::{Gate, GateKind, LogicLevels, DEFAULT_HIGH, DEFAULT_LOW, DEFAULT_THRESHOLD};
pub use sequential::JkFlipFlop;
pub use sources::{Clock, DcVoltage, Ground};

/// Pin layouts of multi-pin elements.
pub mod pins {
    pub use super::display::pin as decoder;
    pub use super::sequential::pin as flip_flop;
}

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Stable kind tag of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Ground,
    DcVoltage,
    Clock,
    Resistor,
    Wire,
    Switch,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Not,
    FlipFlop,
    Decoder,
    Display,
}

impl ComponentKind {
    /// Every kind, in palette order.
    pub const ALL: [ComponentKind; 16] = [
        ComponentKind::Wire,
        ComponentKind::Resistor,
        ComponentKind::Ground,
        ComponentKind::DcVoltage,
        ComponentKind::Clock,
        ComponentKind::Switch,
        ComponentKind::And,
        ComponentKind::Or,
        ComponentKind::Xor,
        ComponentKind::Nand,
        ComponentKind::Nor,
        ComponentKind::Xnor,
        ComponentKind::Not,
        ComponentKind::FlipFlop,
        ComponentKind::Decoder,
        ComponentKind::Display,
    ];

    /// Persisted type identifier.
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Ground => "ground",
            ComponentKind::DcVoltage => "voltage",
            ComponentKind::Clock => "clock",
            ComponentKind::Resistor => "resistor",
            ComponentKind::Wire => "wire",
            ComponentKind::Switch => "switch",
            ComponentKind::And => "and",
            ComponentKind::Or => "or",
            ComponentKind::Xor => "xor",
            ComponentKind::Nand => "nand",
            ComponentKind::Nor => "nor",
            ComponentKind::Xnor => "nxor",
            ComponentKind::Not => "not",
            ComponentKind::FlipFlop => "flipflop",
            ComponentKind::Decoder => "decoder",
            ComponentKind::Display => "lcd",
        }
    }

    /// Parse a persisted type identifier.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Prefix of generated component names.
    pub fn name_prefix(self) -> &'static str {
        match self {
            ComponentKind::Ground => "GND",
            ComponentKind::DcVoltage => "U",
            ComponentKind::Clock => "CLK",
            ComponentKind::Resistor => "R",
            ComponentKind::Wire => "W",
            ComponentKind::Switch => "S",
            ComponentKind::And => "AND",
            ComponentKind::Or => "OR",
            ComponentKind::Xor => "XOR",
            ComponentKind::Nand => "NAND",
            ComponentKind::Nor => "NOR",
            ComponentKind::Xnor => "NXOR",
            ComponentKind::Not => "NOT",
            ComponentKind::FlipFlop => "JK",
            ComponentKind::Decoder => "DEC",
            ComponentKind::Display => "LCD",
        }
    }

    /// Maximum number of nodes a component of this kind can hold.
    pub fn capacity(self) -> usize {
        match self {
            ComponentKind::Ground | ComponentKind::DcVoltage | ComponentKind::Clock => 1,
            ComponentKind::Resistor | ComponentKind::Wire | ComponentKind::Switch => 2,
            ComponentKind::Not => 2,
            ComponentKind::And
            | ComponentKind::Or
            | ComponentKind::Xor
            | ComponentKind::Nand
            | ComponentKind::Nor
            | ComponentKind::Xnor => 3,
            ComponentKind::FlipFlop => sequential::PIN_COUNT,
            ComponentKind::Decoder => DECODER_PINS,
            ComponentKind::Display => SEGMENTS,
        }
    }

    /// Gate function for gate kinds.
    pub fn gate_kind(self) -> Option<GateKind> {
        match self {
            ComponentKind::And => Some(GateKind::And),
            ComponentKind::Or => Some(GateKind::Or),
            ComponentKind::Xor => Some(GateKind::Xor),
            ComponentKind::Nand => Some(GateKind::Nand),
            ComponentKind::Nor => Some(GateKind::Nor),
            ComponentKind::Xnor => Some(GateKind::Xnor),
            ComponentKind::Not => Some(GateKind::Not),
            _ => None,
        }
    }

    /// Check whether the kind transparently joins its two nodes.
    pub fn is_pass_through(self) -> bool {
        matches!(self, ComponentKind::Wire | ComponentKind::Switch)
    }
}

impl From<GateKind> for ComponentKind {
    fn from(kind: GateKind) -> Self {
        match kind {
            GateKind::And => ComponentKind::And,
            GateKind::Or => ComponentKind::Or,
            GateKind::Xor => ComponentKind::Xor,
            GateKind::Nand => ComponentKind::Nand,
            GateKind::Nor => ComponentKind::Nor,
            GateKind::Xnor => ComponentKind::Xnor,
            GateKind::Not => ComponentKind::Not,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A circuit component.
#[derive(Debug, Clone)]
pub enum Component {
    Ground(Ground),
    DcVoltage(DcVoltage),
    Clock(Clock),
    Resistor(Resistor),
    Wire(Wire),
    Switch(Switch),
    Gate(Gate),
    FlipFlop(JkFlipFlop),
    Decoder(Decoder),
    Display(Display),
}

impl Component {
    /// Ground terminal.
    pub fn ground() -> Self {
        Component::Ground(Ground::new())
    }

    /// DC voltage source.
    pub fn dc_voltage(voltage: f64) -> Result<Self> {
        Ok(Component::DcVoltage(DcVoltage::new(voltage)?))
    }

    /// Externally ticked clock source.
    pub fn clock(amplitude: f64, interval_ms: u64) -> Result<Self> {
        Ok(Component::Clock(Clock::new(amplitude, interval_ms)?))
    }

    /// Resistor.
    pub fn resistor(resistance: f64) -> Result<Self> {
        Ok(Component::Resistor(Resistor::new(resistance)?))
    }

    /// Wire.
    pub fn wire() -> Self {
        Component::Wire(Wire::new())
    }

    /// Switch.
    pub fn switch(state: SwitchState) -> Self {
        Component::Switch(Switch::new(state))
    }

    /// Logic gate.
    pub fn gate(kind: GateKind) -> Self {
        Component::Gate(Gate::new(kind))
    }

    /// JK flip-flop.
    pub fn flip_flop() -> Self {
        Component::FlipFlop(JkFlipFlop::new())
    }

    /// 4-to-7 segment decoder.
    pub fn decoder() -> Self {
        Component::Decoder(Decoder::new())
    }

    /// Seven-segment display.
    pub fn display() -> Self {
        Component::Display(Display::new())
    }

    /// Get the component kind.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Ground(_) => ComponentKind::Ground,
            Component::DcVoltage(_) => ComponentKind::DcVoltage,
            Component::Clock(_) => ComponentKind::Clock,
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Wire(_) => ComponentKind::Wire,
            Component::Switch(_) => ComponentKind::Switch,
            Component::Gate(g) => g.kind().into(),
            Component::FlipFlop(_) => ComponentKind::FlipFlop,
            Component::Decoder(_) => ComponentKind::Decoder,
            Component::Display(_) => ComponentKind::Display,
        }
    }

    /// Maximum number of nodes this component can hold.
    pub fn capacity(&self) -> usize {
        self.kind().capacity()
    }
}

/// Per-kind name sequences for one circuit session.
#[derive(Debug, Clone, Default)]
pub struct NameCounter {
    counts: HashMap<ComponentKind, u32>,
}

impl NameCounter {
    /// Create a counter with every sequence at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next name for a kind. Numbers are never reused.
    pub fn next_name(&mut self, kind: ComponentKind) -> String {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        format!("{}{}", kind.name_prefix(), count)
    }

    /// Number of names issued for a kind.
    pub fn issued(&self, kind: ComponentKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}
