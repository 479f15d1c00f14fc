//! Value propagation.
//!
//! Setting a node queues a [`Notification`]; draining the queue asks every
//! other component on that node to re-derive its value, which may set more
//! nodes. The queue is FIFO and each node's components are visited in list
//! order, so the last value applied to a node wins exactly as a depth-first
//! walk would, without the stack growing with the size of the circuit.

use std::collections::HashMap;

use tracing::{trace, warn};

use super::graph::Circuit;
use super::types::{ComponentId, NodeId, Side};
use crate::components::{
    code_from_bits, pins, segments_for, Component, ComponentKind, SEGMENTS,
};

/// A node whose value changed, and the component that changed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Notification {
    pub(crate) node: NodeId,
    /// Component that set the value; it is not re-evaluated
    pub(crate) source: Option<ComponentId>,
}

impl Circuit {
    pub(crate) fn queue(&mut self, node: NodeId, source: Option<ComponentId>) {
        self.pending.push_back(Notification { node, source });
    }

    /// Set a node and queue its fan-out.
    pub(crate) fn drive(&mut self, node: NodeId, value: f64, source: ComponentId) {
        if !self.registry.contains(node) {
            return;
        }
        self.registry.set_value(node, value);
        self.queue(node, Some(source));
    }

    /// Drive every node a component holds.
    pub(crate) fn drive_all(&mut self, id: ComponentId, value: f64) {
        for node in self.node_ids(id).to_vec() {
            self.drive(node, value, id);
        }
    }

    /// Process queued notifications until the graph settles or some
    /// component exceeds its evaluation budget.
    pub(crate) fn drain(&mut self) {
        let budget = self.config.max_evaluations;
        let mut evaluations: HashMap<ComponentId, usize> = HashMap::new();

        while let Some(Notification { node, source }) = self.pending.pop_front() {
            let targets: Vec<ComponentId> = self
                .registry
                .components(node)
                .iter()
                .copied()
                .filter(|&c| Some(c) != source)
                .collect();

            for target in targets {
                let count = evaluations.entry(target).or_insert(0);
                if *count >= budget {
                    warn!(
                        component = %target,
                        budget,
                        pending = self.pending.len(),
                        "propagation did not settle, dropping remaining notifications"
                    );
                    self.pending.clear();
                    return;
                }
                *count += 1;
                self.evaluate(target);
            }
        }
    }

    /// Re-derive a component's value from its nodes, publishing whatever
    /// it drives.
    pub(crate) fn evaluate(&mut self, id: ComponentId) -> f64 {
        let Some(kind) = self.kind(id) else {
            return 0.0;
        };
        match kind {
            ComponentKind::Ground | ComponentKind::DcVoltage | ComponentKind::Clock => {
                self.source_voltage(id)
            }
            ComponentKind::Resistor => self.voltage_across(id),
            k if k.is_pass_through() => self.evaluate_pass_through(id),
            ComponentKind::FlipFlop => self.evaluate_flip_flop(id),
            ComponentKind::Decoder => self.evaluate_decoder(id),
            ComponentKind::Display => self.evaluate_display(id),
            _ => self.evaluate_gate(id),
        }
    }

    fn source_voltage(&self, id: ComponentId) -> f64 {
        match self.component(id) {
            Some(Component::Ground(g)) => g.voltage(),
            Some(Component::DcVoltage(u)) => u.voltage(),
            Some(Component::Clock(c)) => c.voltage(),
            _ => 0.0,
        }
    }

    fn is_high(&self, node: NodeId) -> bool {
        self.config.logic.is_high(self.registry.value(node))
    }

    fn evaluate_pass_through(&mut self, id: ComponentId) -> f64 {
        let nodes = match *self.node_ids(id) {
            [a, b] => [a, b],
            [a] => return self.registry.value(a),
            _ => return 0.0,
        };
        let values = nodes.map(|n| self.registry.value(n));
        let epsilon = self.config.epsilon;

        let Some(slot) = self.entry_mut(id) else {
            return 0.0;
        };
        let (transfer, closed) = match &mut slot.component {
            Component::Wire(w) => (w.pass.sync(values, epsilon), true),
            Component::Switch(s) if s.is_closed() => (s.pass.sync(values, epsilon), true),
            Component::Switch(s) => {
                s.pass.observe_isolated(values, epsilon);
                (None, false)
            }
            _ => return 0.0,
        };

        if let Some(t) = transfer {
            trace!(component = %id, to = ?t.to, value = t.value, "pass-through transfer");
            self.drive(nodes[t.to.index()], t.value, id);
        }
        if closed {
            self.registry.value(nodes[0])
        } else {
            0.0
        }
    }

    fn evaluate_gate(&mut self, id: ComponentId) -> f64 {
        let nodes = self.node_ids(id).to_vec();
        let Some(Component::Gate(gate)) = self.component(id) else {
            return 0.0;
        };
        let kind = gate.kind();
        if nodes.len() < gate.pin_count() {
            return 0.0;
        }

        let arity = kind.arity();
        let inputs: Vec<bool> = nodes[..arity].iter().map(|&n| self.is_high(n)).collect();
        let out = kind.apply(&inputs);

        let changed = match self.entry_mut(id).map(|s| &mut s.component) {
            Some(Component::Gate(g)) => g.published.replace(out) != Some(out),
            _ => false,
        };
        let level = self.config.logic.level(out);
        if changed {
            trace!(component = %id, output = out, "gate output");
            self.drive(nodes[arity], level, id);
        }
        level
    }

    fn evaluate_flip_flop(&mut self, id: ComponentId) -> f64 {
        use pins::flip_flop::{CLK, J, K, Q, Q_BAR};

        let nodes = self.node_ids(id).to_vec();
        if nodes.len() < ComponentKind::FlipFlop.capacity() {
            return 0.0;
        }
        let (j, clk, k) = (self.is_high(nodes[J]), self.is_high(nodes[CLK]), self.is_high(nodes[K]));

        let (q, changed) = match self.entry_mut(id).map(|s| &mut s.component) {
            Some(Component::FlipFlop(ff)) => {
                let q = ff.clock(j, clk, k);
                (q, ff.published.replace(q) != Some(q))
            }
            _ => return 0.0,
        };
        let levels = self.config.logic;
        if changed {
            trace!(component = %id, q, "flip-flop output");
            self.drive(nodes[Q], levels.level(q), id);
            self.drive(nodes[Q_BAR], levels.level(!q), id);
        }
        levels.level(q)
    }

    fn evaluate_decoder(&mut self, id: ComponentId) -> f64 {
        use pins::decoder::{I0, I1, I2, I3, SEGMENT_A};

        let nodes = self.node_ids(id).to_vec();
        if nodes.len() < ComponentKind::Decoder.capacity() {
            return 0.0;
        }
        let code = code_from_bits(
            self.is_high(nodes[I3]),
            self.is_high(nodes[I2]),
            self.is_high(nodes[I1]),
            self.is_high(nodes[I0]),
        );
        let wanted = segments_for(code);

        let mut updates = Vec::with_capacity(SEGMENTS);
        if let Some(Component::Decoder(dec)) = self.entry_mut(id).map(|s| &mut s.component) {
            dec.set_code(Some(code));
            for (i, &on) in wanted.iter().enumerate() {
                if dec.published[i].replace(on) != Some(on) {
                    updates.push((nodes[SEGMENT_A + i], on));
                }
            }
        }
        if !updates.is_empty() {
            trace!(component = %id, code, "decoder output");
        }
        for (node, on) in updates {
            let level = self.config.logic.level(on);
            self.drive(node, level, id);
        }
        f64::from(code)
    }

    fn evaluate_display(&mut self, id: ComponentId) -> f64 {
        let nodes = self.node_ids(id).to_vec();
        let mut lit = [false; SEGMENTS];
        if nodes.len() == SEGMENTS {
            for (seg, &n) in lit.iter_mut().zip(&nodes) {
                *seg = self.is_high(n);
            }
        }
        if let Some(Component::Display(d)) = self.entry_mut(id).map(|s| &mut s.component) {
            d.set_segments(lit);
        }
        0.0
    }

    // ============ Attach / detach hooks ============

    /// Bring a component up to date after it gained nodes.
    pub(crate) fn after_attach(&mut self, id: ComponentId) {
        let Some(slot) = self.entry_mut(id) else {
            return;
        };
        match &mut slot.component {
            Component::Ground(g) => {
                let v = g.voltage();
                self.drive_all(id, v);
            }
            Component::DcVoltage(u) => {
                let v = u.voltage();
                self.drive_all(id, v);
            }
            Component::Clock(c) => {
                let v = c.voltage();
                self.drive_all(id, v);
            }
            Component::Resistor(_) => {}
            Component::Wire(_) | Component::Switch(_) | Component::Display(_) => {
                self.evaluate(id);
            }
            Component::Gate(g) => {
                g.published = None;
                self.evaluate(id);
            }
            Component::FlipFlop(ff) => {
                ff.published = None;
                ff.reset_edge();
                self.evaluate(id);
            }
            Component::Decoder(dec) => {
                dec.forget_outputs();
                self.evaluate(id);
            }
        }
    }

    /// Withdraw whatever a component drives on `node` before it lets go.
    pub(crate) fn before_detach(&mut self, id: ComponentId, node: NodeId) {
        let nodes = self.node_ids(id).to_vec();
        let Some(slot) = self.entry_mut(id) else {
            return;
        };

        let zero: Vec<NodeId> = match &mut slot.component {
            Component::DcVoltage(_) | Component::Clock(_) => vec![node],
            Component::Ground(_) | Component::Resistor(_) | Component::Display(_) => Vec::new(),
            Component::Wire(w) => release_sides(&mut w.pass, &nodes, node),
            Component::Switch(s) if s.is_closed() => release_sides(&mut s.pass, &nodes, node),
            Component::Switch(s) => {
                s.pass.forget_driven();
                Vec::new()
            }
            Component::Gate(g) => {
                let out = g.output_pin();
                match (g.published.take(), nodes.get(out)) {
                    (Some(_), Some(&n)) => vec![n],
                    _ => Vec::new(),
                }
            }
            Component::FlipFlop(ff) => {
                use pins::flip_flop::{Q, Q_BAR};
                match ff.published.take() {
                    Some(_) if nodes.len() > Q_BAR => vec![nodes[Q], nodes[Q_BAR]],
                    _ => Vec::new(),
                }
            }
            Component::Decoder(dec) => {
                let published = std::mem::replace(&mut dec.published, [None; SEGMENTS]);
                dec.set_code(None);
                published
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_some())
                    .filter_map(|(i, _)| nodes.get(pins::decoder::SEGMENT_A + i).copied())
                    .collect()
            }
        };

        for n in zero {
            self.drive(n, 0.0, id);
        }
    }

    /// Clear per-connection state after a component lost every node.
    pub(crate) fn reset_state(&mut self, id: ComponentId) {
        let Some(slot) = self.entry_mut(id) else {
            return;
        };
        match &mut slot.component {
            Component::Wire(w) => w.pass.reset(),
            Component::Switch(s) => s.pass.reset(),
            Component::Gate(g) => g.published = None,
            Component::FlipFlop(ff) => {
                ff.published = None;
                ff.reset_edge();
            }
            Component::Decoder(dec) => {
                dec.forget_outputs();
                dec.set_code(None);
            }
            Component::Display(d) => d.set_segments([false; SEGMENTS]),
            Component::Ground(_)
            | Component::DcVoltage(_)
            | Component::Clock(_)
            | Component::Resistor(_) => {}
        }
    }
}

/// Release the side(s) of a pass-through element that sit on `node`,
/// returning the nodes that must be zeroed.
fn release_sides(
    pass: &mut crate::components::PassThrough,
    nodes: &[NodeId],
    node: NodeId,
) -> Vec<NodeId> {
    [Side::A, Side::B]
        .into_iter()
        .filter(|side| nodes.get(side.index()) == Some(&node))
        .filter(|&side| pass.release(side))
        .map(|_| node)
        .collect()
}
