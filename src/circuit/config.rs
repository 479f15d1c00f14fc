//! Circuit session configuration.

use crate::components::LogicLevels;

/// Tolerance below which two node values are considered equal.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Times a single component may be evaluated within one propagation
/// before the propagation is cut off.
pub const DEFAULT_MAX_EVALUATIONS: usize = 1_000;

/// Configuration for a circuit session.
#[derive(Debug, Clone)]
pub struct CircuitConfig {
    /// Threshold policy and published levels for logic elements.
    pub logic: LogicLevels,
    /// Tolerance used by wires and switches to detect a changed side.
    pub epsilon: f64,
    /// Per-component evaluation budget for a single propagation.
    pub max_evaluations: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            logic: LogicLevels::default(),
            epsilon: DEFAULT_EPSILON,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl CircuitConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logic threshold (values strictly above it read as 1).
    pub fn with_logic_threshold(mut self, threshold: f64) -> Self {
        self.logic.threshold = threshold;
        self
    }

    /// Set the voltages published for logic 1 and logic 0.
    pub fn with_logic_levels(mut self, high: f64, low: f64) -> Self {
        self.logic.high = high;
        self.logic.low = low;
        self
    }

    /// Set the change-detection tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set how many times one component may be evaluated during a single
    /// propagation.
    ///
    /// The budget is counted per component, so a chain settles regardless of
    /// its length; a component is only re-evaluated that often under
    /// oscillating feedback (for example a NOT gate wired to its own input).
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = CircuitConfig::new()
            .with_logic_threshold(2.5)
            .with_logic_levels(3.3, 0.0)
            .with_epsilon(1e-9)
            .with_max_evaluations(10);
        assert_eq!(config.logic.threshold, 2.5);
        assert_eq!(config.logic.high, 3.3);
        assert_eq!(config.epsilon, 1e-9);
        assert_eq!(config.max_evaluations, 10);
    }
}
