//! Edge-triggered storage: the JK flip-flop.

/// Pin positions of a JK flip-flop.
pub mod pin {
    pub const J: usize = 0;
    pub const CLK: usize = 1;
    pub const K: usize = 2;
    pub const Q: usize = 3;
    pub const Q_BAR: usize = 4;
}

/// Number of pins of a JK flip-flop.
pub const PIN_COUNT: usize = 5;

/// A JK flip-flop clocked on the rising edge.
#[derive(Debug, Clone, Default)]
pub struct JkFlipFlop {
    q: bool,
    /// Previous clock sample; `None` until the first evaluation
    last_clock: Option<bool>,
    pub(crate) published: Option<bool>,
}

impl JkFlipFlop {
    /// Create a cleared flip-flop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latched state.
    pub fn q(&self) -> bool {
        self.q
    }

    /// Force the latched state (asynchronous preset / clear).
    pub fn force(&mut self, q: bool) {
        self.q = q;
    }

    /// Feed one sample of the inputs.
    ///
    /// The latch changes only when the clock goes from low to high. The
    /// very first sample primes the edge detector without clocking.
    pub fn clock(&mut self, j: bool, clk: bool, k: bool) -> bool {
        let rising = self.last_clock == Some(false) && clk;
        self.last_clock = Some(clk);

        if rising {
            self.q = match (j, k) {
                (false, false) => self.q,
                (true, false) => true,
                (false, true) => false,
                (true, true) => !self.q,
            };
        }
        self.q
    }

    /// Forget the clock history (after a re-wire).
    pub(crate) fn reset_edge(&mut self) {
        self.last_clock = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(ff: &mut JkFlipFlop, j: bool, k: bool) -> bool {
        ff.clock(j, false, k);
        ff.clock(j, true, k)
    }

    #[test]
    fn test_first_sample_only_primes() {
        let mut ff = JkFlipFlop::new();
        assert!(!ff.clock(true, true, false));
        // Still high: no edge
        assert!(!ff.clock(true, true, false));
    }

    #[test]
    fn test_jk_table() {
        let mut ff = JkFlipFlop::new();
        ff.clock(false, false, false);

        assert!(pulse(&mut ff, true, false)); // set
        assert!(pulse(&mut ff, false, false)); // hold
        assert!(!pulse(&mut ff, false, true)); // reset
        assert!(pulse(&mut ff, true, true)); // toggle
        assert!(!pulse(&mut ff, true, true)); // toggle
    }

    #[test]
    fn test_falling_edge_ignored() {
        let mut ff = JkFlipFlop::new();
        ff.clock(true, true, false);
        assert!(!ff.clock(true, false, false));
    }

    #[test]
    fn test_force() {
        let mut ff = JkFlipFlop::new();
        ff.force(true);
        assert!(ff.q());
        ff.reset_edge();
        assert!(ff.clock(false, true, true));
    }
}
