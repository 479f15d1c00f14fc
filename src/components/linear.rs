//! Linear passive components: Resistor.

use crate::error::{CircuitError, Result};

/// A resistor.
///
/// The resistor is a boundary in the connection graph: it never writes to
/// its nodes. Its value is the voltage across it, `v(n1) - v(n0)`, and the
/// current and power follow from Ohm's law.
#[derive(Debug, Clone)]
pub struct Resistor {
    resistance: f64,
}

impl Resistor {
    /// Create a new resistor. Resistance must be positive and finite.
    pub fn new(resistance: f64) -> Result<Self> {
        check_resistance(resistance)?;
        Ok(Self { resistance })
    }

    /// Get the resistance in ohms.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Set the resistance in ohms.
    pub fn set_resistance(&mut self, resistance: f64) -> Result<()> {
        check_resistance(resistance)?;
        self.resistance = resistance;
        Ok(())
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Current through the resistor for a given voltage across it.
    pub fn current(&self, voltage: f64) -> f64 {
        voltage / self.resistance
    }

    /// Dissipated power for a given voltage across it.
    pub fn power(&self, voltage: f64) -> f64 {
        voltage * self.current(voltage)
    }
}

fn check_resistance(resistance: f64) -> Result<()> {
    if resistance > 0.0 && resistance.is_finite() {
        Ok(())
    } else {
        Err(CircuitError::invalid_parameter(
            "resistor",
            "resistance",
            format!("must be positive, got {resistance}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resistor_conductance() {
        let r = Resistor::new(1000.0).unwrap();
        assert!((r.conductance() - 0.001).abs() < 1e-10);
    }

    #[test]
    fn test_resistor_ohms_law() {
        let r = Resistor::new(2000.0).unwrap();
        assert_relative_eq!(r.current(10.0), 0.005);
        assert_relative_eq!(r.power(10.0), 0.05);
        assert_relative_eq!(r.current(-10.0), -0.005);
    }

    #[test]
    fn test_resistor_rejects_non_positive() {
        assert!(Resistor::new(0.0).is_err());
        assert!(Resistor::new(-5.0).is_err());
        assert!(Resistor::new(f64::NAN).is_err());

        let mut r = Resistor::new(10.0).unwrap();
        assert!(r.set_resistance(0.0).is_err());
        assert_eq!(r.resistance(), 10.0);
    }
}
