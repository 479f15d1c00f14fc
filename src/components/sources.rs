//! Single-terminal sources: Ground, DC voltage and Clock.
//!
//! A source drives the one node it is attached to. The driven value is
//! written when the source is connected and whenever its magnitude changes;
//! reading the source's value never re-drives the node.

use crate::error::{CircuitError, Result};

/// Reference potential. Always 0 V.
#[derive(Debug, Clone, Default)]
pub struct Ground;

impl Ground {
    /// Create a ground terminal.
    pub fn new() -> Self {
        Self
    }

    /// Get the driven voltage.
    pub fn voltage(&self) -> f64 {
        0.0
    }
}

/// An adjustable DC voltage source.
#[derive(Debug, Clone)]
pub struct DcVoltage {
    voltage: f64,
}

impl DcVoltage {
    /// Create a new source. The magnitude may be negative but must be finite.
    pub fn new(voltage: f64) -> Result<Self> {
        check_voltage("DC voltage", voltage)?;
        Ok(Self { voltage })
    }

    /// Get the source voltage.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Set the source voltage.
    pub fn set_voltage(&mut self, voltage: f64) -> Result<()> {
        check_voltage("DC voltage", voltage)?;
        self.voltage = voltage;
        Ok(())
    }
}

/// A square-wave source toggled by the caller.
///
/// The core has no timer: whoever owns the schedule calls
/// [`Circuit::tick_clock`](crate::Circuit::tick_clock) once per half period.
/// The interval is only carried so it can be displayed and persisted.
#[derive(Debug, Clone)]
pub struct Clock {
    amplitude: f64,
    interval_ms: u64,
    high: bool,
}

impl Clock {
    /// Create a clock that starts high at `amplitude`.
    pub fn new(amplitude: f64, interval_ms: u64) -> Result<Self> {
        check_voltage("clock", amplitude)?;
        check_interval(interval_ms)?;
        Ok(Self {
            amplitude,
            interval_ms,
            high: true,
        })
    }

    /// Current output voltage.
    pub fn voltage(&self) -> f64 {
        if self.high {
            self.amplitude
        } else {
            0.0
        }
    }

    /// Voltage of the high phase.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Set the voltage of the high phase.
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        check_voltage("clock", amplitude)?;
        self.amplitude = amplitude;
        Ok(())
    }

    /// Half period in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Set the half period in milliseconds.
    pub fn set_interval_ms(&mut self, interval_ms: u64) -> Result<()> {
        check_interval(interval_ms)?;
        self.interval_ms = interval_ms;
        Ok(())
    }

    /// Toggle frequency in Hz.
    pub fn frequency(&self) -> f64 {
        1000.0 / self.interval_ms as f64
    }

    /// Check whether the output is in the high phase.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Flip the output phase and return the new voltage.
    pub fn toggle(&mut self) -> f64 {
        self.high = !self.high;
        self.voltage()
    }
}

fn check_voltage(component: &str, voltage: f64) -> Result<()> {
    if voltage.is_finite() {
        Ok(())
    } else {
        Err(CircuitError::invalid_parameter(
            component,
            "voltage",
            format!("must be finite, got {voltage}"),
        ))
    }
}

fn check_interval(interval_ms: u64) -> Result<()> {
    if interval_ms > 0 {
        Ok(())
    } else {
        Err(CircuitError::invalid_parameter(
            "clock",
            "interval",
            "must be at least 1 ms",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_voltage_rejects_nan() {
        assert!(DcVoltage::new(f64::NAN).is_err());
        assert!(DcVoltage::new(f64::INFINITY).is_err());
        assert!(DcVoltage::new(-12.0).is_ok());
    }

    #[test]
    fn test_dc_set_voltage_keeps_old_on_error() {
        let mut u = DcVoltage::new(5.0).unwrap();
        assert!(u.set_voltage(f64::NAN).is_err());
        assert_eq!(u.voltage(), 5.0);
    }

    #[test]
    fn test_clock_toggle() {
        let mut clk = Clock::new(5.0, 500).unwrap();
        assert_eq!(clk.voltage(), 5.0);
        assert_eq!(clk.toggle(), 0.0);
        assert!(!clk.is_high());
        assert_eq!(clk.toggle(), 5.0);
        assert!((clk.frequency() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_clock_rejects_zero_interval() {
        assert!(Clock::new(5.0, 0).is_err());
        let mut clk = Clock::new(5.0, 10).unwrap();
        assert!(clk.set_interval_ms(0).is_err());
        assert_eq!(clk.interval_ms(), 10);
    }
}
