//! Pass-through components: Wire and Switch.
//!
//! A pass-through element joins two nodes so that a value set on either one
//! shows up on the other. Each side remembers the last value it saw; an
//! evaluation only copies across when a side moved away from its cached
//! value, which is what stops an echo from bouncing back forever.

use crate::circuit::Side;

/// Tolerant float comparison used to decide that a side has changed.
pub fn values_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// A value copy requested by a pass-through evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    /// Side whose node receives the value
    pub to: Side,
    /// Value to write
    pub value: f64,
}

/// Per-side cache shared by wires and switches.
#[derive(Debug, Clone, Default)]
pub struct PassThrough {
    last: [f64; 2],
    driven: Option<Side>,
}

impl PassThrough {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value seen on a side.
    pub fn last_seen(&self, side: Side) -> f64 {
        self.last[side.index()]
    }

    /// Side that most recently received a forced value.
    pub fn driven(&self) -> Option<Side> {
        self.driven
    }

    /// Compare live node values against the cache and decide what to copy.
    ///
    /// Side A is checked first: when both sides moved, A wins and B is
    /// overwritten. With neither side moved, a driven side whose node no
    /// longer matches the authoritative side is re-asserted.
    pub fn sync(&mut self, values: [f64; 2], epsilon: f64) -> Option<Transfer> {
        let [a, b] = values;

        if !values_equal(self.last[0], a, epsilon) {
            return self.take_from(Side::A, values, epsilon);
        }
        if !values_equal(self.last[1], b, epsilon) {
            return self.take_from(Side::B, values, epsilon);
        }

        let driven = self.driven?;
        let authoritative = self.last[driven.other().index()];
        if values_equal(values[driven.index()], authoritative, epsilon) {
            return None;
        }
        self.last[driven.index()] = authoritative;
        Some(Transfer {
            to: driven,
            value: authoritative,
        })
    }

    fn take_from(&mut self, source: Side, values: [f64; 2], epsilon: f64) -> Option<Transfer> {
        let target = source.other();
        let value = values[source.index()];
        self.last = [value, value];
        self.driven = Some(target);

        if values_equal(values[target.index()], value, epsilon) {
            None
        } else {
            Some(Transfer { to: target, value })
        }
    }

    /// Track sides while not conducting: a side that dropped to zero is
    /// remembered as zero, anything else keeps its cached value.
    pub fn observe_isolated(&mut self, values: [f64; 2], epsilon: f64) {
        for (last, value) in self.last.iter_mut().zip(values) {
            if values_equal(value, 0.0, epsilon) {
                *last = value;
            }
        }
    }

    /// Zero the cache of the driven side, keeping it marked as driven.
    ///
    /// Returns the side whose node must be zeroed.
    pub fn break_driven(&mut self) -> Option<Side> {
        let side = self.driven?;
        self.last[side.index()] = 0.0;
        Some(side)
    }

    /// Forget a side that is being detached. Returns `true` if it was the
    /// driven side, in which case its node must be zeroed.
    pub fn release(&mut self, side: Side) -> bool {
        if self.driven == Some(side) {
            self.last[side.index()] = 0.0;
            self.driven = None;
            true
        } else {
            false
        }
    }

    /// Drop the driven mark without touching the cache. A non-conducting
    /// element drives nothing, so detaching it zeroes no node.
    pub fn forget_driven(&mut self) {
        self.driven = None;
    }

    /// Clear the whole cache.
    pub fn reset(&mut self) {
        self.last = [0.0; 2];
        self.driven = None;
    }
}

/// An ideal wire between two nodes.
#[derive(Debug, Clone, Default)]
pub struct Wire {
    pub(crate) pass: PassThrough,
}

impl Wire {
    /// Create a new wire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Side that most recently received a forced value.
    pub fn driven(&self) -> Option<Side> {
        self.pass.driven()
    }
}

/// Switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Open,
    Closed,
}

impl SwitchState {
    /// Build from the persisted "is open" flag.
    pub fn from_open(open: bool) -> Self {
        if open {
            SwitchState::Open
        } else {
            SwitchState::Closed
        }
    }
}

/// A switch: a wire that can be opened.
#[derive(Debug, Clone)]
pub struct Switch {
    state: SwitchState,
    pub(crate) pass: PassThrough,
}

impl Switch {
    /// Create a new switch in the given state.
    pub fn new(state: SwitchState) -> Self {
        Self {
            state,
            pass: PassThrough::new(),
        }
    }

    /// Get the switch state.
    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Check whether the switch is open.
    pub fn is_open(&self) -> bool {
        self.state == SwitchState::Open
    }

    /// Check whether the switch is closed.
    pub fn is_closed(&self) -> bool {
        self.state == SwitchState::Closed
    }

    pub(crate) fn set_state(&mut self, state: SwitchState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_sync_copies_changed_side() {
        let mut pass = PassThrough::new();
        let t = pass.sync([5.0, 0.0], EPS);
        assert_eq!(t, Some(Transfer { to: Side::B, value: 5.0 }));
        assert_eq!(pass.driven(), Some(Side::B));

        // Echo comes back equal: nothing to do
        assert_eq!(pass.sync([5.0, 5.0], EPS), None);
    }

    #[test]
    fn test_sync_b_side() {
        let mut pass = PassThrough::new();
        let t = pass.sync([0.0, 3.3], EPS);
        assert_eq!(t, Some(Transfer { to: Side::A, value: 3.3 }));
        assert_eq!(pass.driven(), Some(Side::A));
    }

    #[test]
    fn test_sync_a_wins_tie() {
        let mut pass = PassThrough::new();
        let t = pass.sync([1.0, 2.0], EPS);
        assert_eq!(t, Some(Transfer { to: Side::B, value: 1.0 }));
        assert_eq!(pass.last_seen(Side::B), 1.0);
    }

    #[test]
    fn test_sync_already_equal_marks_without_transfer() {
        let mut pass = PassThrough::new();
        assert_eq!(pass.sync([4.0, 4.0], EPS), None);
        assert_eq!(pass.driven(), Some(Side::B));
        assert_eq!(pass.last_seen(Side::A), 4.0);
    }

    #[test]
    fn test_break_then_reassert() {
        let mut pass = PassThrough::new();
        pass.sync([5.0, 0.0], EPS);
        assert_eq!(pass.break_driven(), Some(Side::B));
        pass.observe_isolated([5.0, 0.0], EPS);

        let t = pass.sync([5.0, 0.0], EPS);
        assert_eq!(t, Some(Transfer { to: Side::B, value: 5.0 }));
    }

    #[test]
    fn test_observe_isolated_keeps_nonzero() {
        let mut pass = PassThrough::new();
        pass.sync([5.0, 0.0], EPS);
        pass.observe_isolated([9.0, 0.0], EPS);
        assert_eq!(pass.last_seen(Side::A), 5.0);
        assert_eq!(pass.last_seen(Side::B), 0.0);
    }

    #[test]
    fn test_release_only_driven_side() {
        let mut pass = PassThrough::new();
        pass.sync([5.0, 0.0], EPS);
        assert!(!pass.release(Side::A));
        assert!(pass.release(Side::B));
        assert_eq!(pass.driven(), None);
    }

    #[test]
    fn test_forget_driven_keeps_cache() {
        let mut pass = PassThrough::new();
        pass.sync([5.0, 0.0], EPS);
        pass.break_driven();
        pass.forget_driven();
        assert_eq!(pass.driven(), None);
        assert_eq!(pass.last_seen(Side::A), 5.0);
        assert!(!pass.release(Side::B));
    }

    #[test]
    fn test_switch_state() {
        let mut sw = Switch::new(SwitchState::from_open(true));
        assert!(sw.is_open());
        sw.set_state(SwitchState::Closed);
        assert!(sw.is_closed());
    }
}
