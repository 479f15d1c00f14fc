//! Human-readable component summaries.

use std::fmt::{self, Write};

use super::graph::Circuit;
use super::types::ComponentId;
use crate::components::{Component, SEGMENT_NAMES};

impl Circuit {
    /// Multi-line description of a component: name, value and the
    /// parameters that matter for its kind.
    pub fn summary(&mut self, id: ComponentId) -> Option<String> {
        let value = self.value(id)?;
        let mut out = String::new();
        self.write_summary(id, value, &mut out).ok()?;
        Some(out)
    }

    fn write_summary(&self, id: ComponentId, value: f64, out: &mut String) -> fmt::Result {
        let Some(slot) = self.entry(id) else {
            return Ok(());
        };
        writeln!(out, "{}", slot.name)?;
        writeln!(out, "U = {value:.2} V")?;

        match &slot.component {
            Component::Resistor(r) => {
                let current = r.current(value);
                writeln!(out, "R = {:.2} Ohm", r.resistance())?;
                writeln!(out, "I = {current:.4} A")?;
                writeln!(out, "P = {:.4} W", value * current)?;
            }
            Component::Switch(s) => {
                let state = if s.is_open() { "open" } else { "closed" };
                writeln!(out, "State: {state}")?;
            }
            Component::Clock(c) => {
                writeln!(out, "time = {} ms", c.interval_ms())?;
                writeln!(out, "f = {:.2} Hz", c.frequency())?;
            }
            Component::Gate(g) => {
                let inputs: Vec<&str> = slot.nodes[..slot.nodes.len().min(g.kind().arity())]
                    .iter()
                    .map(|&n| bit(self.config.logic.is_high(self.registry.value(n))))
                    .collect();
                writeln!(out, "Inputs: {}", inputs.join(" "))?;
                writeln!(out, "Output: {}", g.output().map_or("-", bit))?;
            }
            Component::FlipFlop(ff) => {
                writeln!(out, "Q = {}", bit(ff.q()))?;
                writeln!(out, "Q' = {}", bit(!ff.q()))?;
            }
            Component::Decoder(dec) => match dec.code() {
                Some(code) => writeln!(out, "Code: {code:X}")?,
                None => writeln!(out, "Code: -")?,
            },
            Component::Display(d) => {
                let lit: String = d
                    .segments()
                    .iter()
                    .zip(SEGMENT_NAMES)
                    .filter(|(on, _)| **on)
                    .map(|(_, name)| name)
                    .collect();
                writeln!(out, "Segments: {lit}")?;
                match d.digit() {
                    Some(digit) => writeln!(out, "Digit: {digit:X}")?,
                    None => writeln!(out, "Digit: -")?,
                }
            }
            Component::Ground(_) | Component::DcVoltage(_) | Component::Wire(_) => {}
        }
        Ok(())
    }
}

fn bit(high: bool) -> &'static str {
    if high {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Point;
    use crate::components::SwitchState;

    #[test]
    fn test_resistor_summary() {
        let mut c = Circuit::new();
        let u = c.add(Component::dc_voltage(10.0).unwrap());
        let r = c.add(Component::resistor(100.0).unwrap());
        let gnd = c.add(Component::ground());
        c.connect(u, &[Point::new(0, 10)]).unwrap();
        c.connect(gnd, &[Point::new(0, 0)]).unwrap();
        c.connect(r, &[Point::new(0, 0), Point::new(0, 10)]).unwrap();

        let text = c.summary(r).unwrap();
        assert_eq!(
            text,
            "R1\nU = 10.00 V\nR = 100.00 Ohm\nI = 0.1000 A\nP = 1.0000 W\n"
        );
    }

    #[test]
    fn test_switch_and_clock_summary() {
        let mut c = Circuit::new();
        let s = c.add(Component::switch(SwitchState::Open));
        let clk = c.add(Component::clock(5.0, 250).unwrap());
        assert_eq!(c.summary(s).unwrap(), "S1\nU = 0.00 V\nState: open\n");
        assert_eq!(
            c.summary(clk).unwrap(),
            "CLK1\nU = 5.00 V\ntime = 250 ms\nf = 4.00 Hz\n"
        );
    }

    #[test]
    fn test_unknown_component() {
        let mut c = Circuit::new();
        assert!(c.summary(ComponentId(42)).is_none());
    }
}
