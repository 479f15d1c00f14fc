//! Combinational logic gates and the threshold policy they share.
//!
//! Logic elements sit on the same continuous-voltage nodes as everything
//! else. Inputs are classified with [`LogicLevels::is_high`]; outputs are
//! published as [`LogicLevels::high`] or [`LogicLevels::low`].

/// Threshold policy mapping node voltages to logic levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicLevels {
    /// Values strictly above this are logic 1
    pub threshold: f64,
    /// Voltage published for logic 1
    pub high: f64,
    /// Voltage published for logic 0
    pub low: f64,
}

impl Default for LogicLevels {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            high: DEFAULT_HIGH,
            low: DEFAULT_LOW,
        }
    }
}

/// Default logic threshold: zero and below read as 0.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Default published high level.
pub const DEFAULT_HIGH: f64 = 5.0;

/// Default published low level.
pub const DEFAULT_LOW: f64 = 0.0;

impl LogicLevels {
    /// Interpret a node value as a logic level.
    pub fn is_high(&self, voltage: f64) -> bool {
        voltage > self.threshold
    }

    /// Voltage representing a logic level.
    pub fn level(&self, bit: bool) -> f64 {
        if bit {
            self.high
        } else {
            self.low
        }
    }
}

/// Boolean function of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Not,
}

impl GateKind {
    /// Number of inputs.
    pub fn arity(self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => 2,
        }
    }

    /// Evaluate the gate function. `inputs` must hold [`arity`](Self::arity) values.
    pub fn apply(self, inputs: &[bool]) -> bool {
        match self {
            GateKind::And => inputs.iter().all(|&b| b),
            GateKind::Or => inputs.iter().any(|&b| b),
            GateKind::Xor => inputs.iter().filter(|&&b| b).count() % 2 == 1,
            GateKind::Nand => !inputs.iter().all(|&b| b),
            GateKind::Nor => !inputs.iter().any(|&b| b),
            GateKind::Xnor => inputs.iter().filter(|&&b| b).count() % 2 == 0,
            GateKind::Not => !inputs.first().copied().unwrap_or(false),
        }
    }
}

/// A logic gate: inputs first, output last.
#[derive(Debug, Clone)]
pub struct Gate {
    kind: GateKind,
    pub(crate) published: Option<bool>,
}

impl Gate {
    /// Create a new gate.
    pub fn new(kind: GateKind) -> Self {
        Self {
            kind,
            published: None,
        }
    }

    /// Get the gate function.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Number of pins (inputs plus output).
    pub fn pin_count(&self) -> usize {
        self.kind.arity() + 1
    }

    /// Position of the output pin.
    pub fn output_pin(&self) -> usize {
        self.kind.arity()
    }

    /// Last output bit written to the output node.
    pub fn output(&self) -> Option<bool> {
        self.published
    }
}
