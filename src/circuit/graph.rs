//! Circuit graph structure and the connection protocol.

use std::collections::VecDeque;

use tracing::debug;

use super::config::CircuitConfig;
use super::propagate::Notification;
use super::registry::NodeRegistry;
use super::types::{ComponentId, NodeId, NodeView, Point};
use crate::components::{Component, ComponentKind, NameCounter, SwitchState};
use crate::error::{CircuitError, Result};

/// A component together with its place in the graph.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) name: String,
    /// Orientation in degrees, 0..360
    pub(crate) rotation: i32,
    /// Attached nodes in pin order
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) component: Component,
}

/// A circuit editing session: the node registry, every component, and the
/// propagation machinery that keeps node values consistent.
#[derive(Debug)]
pub struct Circuit {
    pub(crate) config: CircuitConfig,
    pub(crate) registry: NodeRegistry,
    /// Component arena indexed by [`ComponentId`]; removed slots stay `None`
    pub(crate) slots: Vec<Option<Slot>>,
    names: NameCounter,
    /// Fan-out notifications waiting to be processed
    pub(crate) pending: VecDeque<Notification>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    /// Create an empty circuit with default configuration.
    pub fn new() -> Self {
        Self::with_config(CircuitConfig::default())
    }

    /// Create an empty circuit with custom configuration.
    pub fn with_config(config: CircuitConfig) -> Self {
        Self {
            config,
            registry: NodeRegistry::new(),
            slots: Vec::new(),
            names: NameCounter::new(),
            pending: VecDeque::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    /// Get the node registry.
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    // ============ Component lifecycle ============

    /// Add a detached component and return its id.
    pub fn add(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.slots.len());
        let name = self.names.next_name(component.kind());
        debug!(component = %name, "added");
        self.slots.push(Some(Slot {
            name,
            rotation: 0,
            nodes: Vec::with_capacity(component.capacity()),
            component,
        }));
        id
    }

    /// Disconnect a component from everything and drop it.
    pub fn remove(&mut self, id: ComponentId) -> Result<()> {
        self.disconnect(id)?;
        if let Some(slot) = self.slots.get_mut(id.0).and_then(Option::take) {
            debug!(component = %slot.name, "removed");
        }
        Ok(())
    }

    /// Check whether an id refers to a live component.
    pub fn contains(&self, id: ComponentId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Check whether the circuit has no components.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live components, in creation order.
    pub fn ids(&self) -> Vec<ComponentId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ComponentId(i))
            .collect()
    }

    // ============ Connection protocol ============

    /// Attach a component to the nodes at `points`, in pin order.
    ///
    /// Fails with [`CircuitError::CapacityExceeded`] without touching any
    /// existing connection if the component would hold more nodes than its
    /// kind allows.
    pub fn connect(&mut self, id: ComponentId, points: &[Point]) -> Result<()> {
        let slot = self.slot(id)?;
        let capacity = slot.component.capacity();
        let requested = slot.nodes.len() + points.len();
        if requested > capacity {
            return Err(CircuitError::CapacityExceeded {
                component: slot.name.clone(),
                capacity,
                requested,
            });
        }

        for &point in points {
            let node = self.registry.attach(point, id);
            if let Some(slot) = self.entry_mut(id) {
                slot.nodes.push(node);
            }
        }
        debug!(component = %id, points = points.len(), "connected");

        self.after_attach(id);
        self.drain();
        Ok(())
    }

    /// Detach a component from the node at `point`.
    ///
    /// Does nothing if there is no node there or the component is not
    /// attached to it. Components still on the node are notified.
    pub fn disconnect_at(&mut self, id: ComponentId, point: Point) -> Result<()> {
        let slot = self.slot(id)?;
        let Some(node) = self.registry.find(point) else {
            return Ok(());
        };
        if !slot.nodes.contains(&node) {
            return Ok(());
        }

        self.before_detach(id, node);
        self.detach_node(id, node);
        debug!(component = %id, %point, "disconnected");
        self.drain();
        Ok(())
    }

    /// Detach a component from every node it holds.
    pub fn disconnect(&mut self, id: ComponentId) -> Result<()> {
        let mut nodes = self.slot(id)?.nodes.clone();
        let mut seen = Vec::with_capacity(nodes.len());
        nodes.retain(|n| {
            if seen.contains(n) {
                false
            } else {
                seen.push(*n);
                true
            }
        });

        // Withdraw on every node while pin positions are still intact
        for &node in &nodes {
            self.before_detach(id, node);
        }
        for node in nodes {
            self.detach_node(id, node);
        }
        self.reset_state(id);
        debug!(component = %id, "disconnected from all nodes");
        self.drain();
        Ok(())
    }

    /// Move the attachment at `from` to `to`, keeping its pin position.
    ///
    /// With no node at `from` this is a plain connect at `to`. If the
    /// component is not attached at `from`, nothing happens.
    pub fn reconnect(&mut self, id: ComponentId, from: Point, to: Point) -> Result<()> {
        let nodes = self.slot(id)?.nodes.clone();
        if from == to {
            return Ok(());
        }
        let Some(old) = self.registry.find(from) else {
            return self.connect(id, &[to]);
        };
        let positions: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, &n)| n == old)
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            return Ok(());
        }

        self.before_detach(id, old);
        for (k, &pos) in positions.iter().enumerate() {
            let still_pinned = k + 1 < positions.len();
            self.registry.detach(old, id, still_pinned);
            let new = self.registry.attach(to, id);
            if let Some(slot) = self.entry_mut(id) {
                slot.nodes[pos] = new;
            }
        }
        if self.registry.contains(old) {
            self.queue(old, None);
        }
        debug!(component = %id, %from, %to, "reconnected");

        self.after_attach(id);
        self.drain();
        Ok(())
    }

    /// Remove every pin of `id` on `node` and notify whoever is left there.
    fn detach_node(&mut self, id: ComponentId, node: NodeId) {
        let Some(slot) = self.entry_mut(id) else {
            return;
        };
        let count = slot.nodes.iter().filter(|&&n| n == node).count();
        slot.nodes.retain(|&n| n != node);

        for k in 0..count {
            self.registry.detach(node, id, k + 1 < count);
        }
        if self.registry.contains(node) {
            self.queue(node, None);
        }
    }

    // ============ Queries ============

    /// Generated name of a component.
    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.entry(id).map(|s| s.name.as_str())
    }

    /// Kind of a component.
    pub fn kind(&self, id: ComponentId) -> Option<ComponentKind> {
        self.entry(id).map(|s| s.component.kind())
    }

    /// Type tag of a component.
    pub fn type_tag(&self, id: ComponentId) -> Option<&'static str> {
        self.kind(id).map(ComponentKind::tag)
    }

    /// Component state.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.entry(id).map(|s| &s.component)
    }

    /// Orientation in degrees.
    pub fn rotation(&self, id: ComponentId) -> Option<i32> {
        self.entry(id).map(|s| s.rotation)
    }

    /// Rotate a component by `angle` degrees. Connections are untouched;
    /// the editor re-connects the rotated pins itself.
    pub fn rotate(&mut self, id: ComponentId, angle: i32) -> Result<()> {
        let slot = self.slot_mut(id)?;
        slot.rotation = (slot.rotation + angle).rem_euclid(360);
        Ok(())
    }

    /// Attached nodes of a component in pin order.
    pub fn node_ids(&self, id: ComponentId) -> &[NodeId] {
        self.entry(id).map(|s| s.nodes.as_slice()).unwrap_or(&[])
    }

    /// Coordinates and live values of a component's nodes, in pin order.
    pub fn nodes(&self, id: ComponentId) -> Vec<NodeView> {
        self.node_ids(id)
            .iter()
            .filter_map(|&n| {
                let node = self.registry.get(n)?;
                Some(NodeView {
                    point: node.point(),
                    value: node.value(),
                })
            })
            .collect()
    }

    /// Node at a coordinate, if any.
    pub fn find_node(&self, point: Point) -> Option<NodeId> {
        self.registry.find(point)
    }

    /// Value of the node at a coordinate, if any.
    pub fn node_value(&self, point: Point) -> Option<f64> {
        self.registry.find(point).map(|n| self.registry.value(n))
    }

    /// Current value of a component.
    ///
    /// Reading a value re-derives it, which may push values through
    /// pass-through elements and republish logic outputs.
    pub fn value(&mut self, id: ComponentId) -> Option<f64> {
        if !self.contains(id) {
            return None;
        }
        let value = self.evaluate(id);
        self.drain();
        Some(value)
    }

    /// Voltage across a resistor (`v(n1) - v(n0)`), without propagation.
    pub fn resistor_voltage(&self, id: ComponentId) -> Option<f64> {
        match &self.entry(id)?.component {
            Component::Resistor(_) => Some(self.voltage_across(id)),
            _ => None,
        }
    }

    /// Current through a resistor.
    pub fn resistor_current(&self, id: ComponentId) -> Option<f64> {
        match &self.entry(id)?.component {
            Component::Resistor(r) => Some(r.current(self.voltage_across(id))),
            _ => None,
        }
    }

    /// Power dissipated by a resistor.
    pub fn resistor_power(&self, id: ComponentId) -> Option<f64> {
        match &self.entry(id)?.component {
            Component::Resistor(r) => Some(r.power(self.voltage_across(id))),
            _ => None,
        }
    }

    pub(crate) fn voltage_across(&self, id: ComponentId) -> f64 {
        match self.node_ids(id) {
            [n0, n1] => self.registry.value(*n1) - self.registry.value(*n0),
            _ => 0.0,
        }
    }

    // ============ Parameters ============

    /// Set the magnitude of a DC source or the high level of a clock.
    pub fn set_voltage(&mut self, id: ComponentId, voltage: f64) -> Result<()> {
        let slot = self.slot_mut(id)?;
        let driven = match &mut slot.component {
            Component::DcVoltage(u) => {
                u.set_voltage(voltage)?;
                u.voltage()
            }
            Component::Clock(c) => {
                c.set_amplitude(voltage)?;
                c.voltage()
            }
            _ => return Err(CircuitError::unsupported(slot.name.clone(), "set_voltage")),
        };
        self.drive_all(id, driven);
        self.drain();
        Ok(())
    }

    /// Set the resistance of a resistor.
    pub fn set_resistance(&mut self, id: ComponentId, resistance: f64) -> Result<()> {
        let slot = self.slot_mut(id)?;
        match &mut slot.component {
            Component::Resistor(r) => r.set_resistance(resistance),
            _ => Err(CircuitError::unsupported(slot.name.clone(), "set_resistance")),
        }
    }

    /// Set the half period of a clock.
    pub fn set_clock_interval(&mut self, id: ComponentId, interval_ms: u64) -> Result<()> {
        let slot = self.slot_mut(id)?;
        match &mut slot.component {
            Component::Clock(c) => c.set_interval_ms(interval_ms),
            _ => Err(CircuitError::unsupported(slot.name.clone(), "set_clock_interval")),
        }
    }

    /// Flip a clock's output and propagate it. Returns the new voltage.
    pub fn tick_clock(&mut self, id: ComponentId) -> Result<f64> {
        let slot = self.slot_mut(id)?;
        let voltage = match &mut slot.component {
            Component::Clock(c) => c.toggle(),
            _ => return Err(CircuitError::unsupported(slot.name.clone(), "tick_clock")),
        };
        self.drive_all(id, voltage);
        self.drain();
        Ok(voltage)
    }

    /// Open a switch.
    pub fn open_switch(&mut self, id: ComponentId) -> Result<()> {
        self.set_switch_state(id, SwitchState::Open)
    }

    /// Close a switch.
    pub fn close_switch(&mut self, id: ComponentId) -> Result<()> {
        self.set_switch_state(id, SwitchState::Closed)
    }

    /// Flip a switch. Returns the new state.
    pub fn toggle_switch(&mut self, id: ComponentId) -> Result<SwitchState> {
        let slot = self.slot(id)?;
        let next = match &slot.component {
            Component::Switch(s) if s.is_open() => SwitchState::Closed,
            Component::Switch(_) => SwitchState::Open,
            _ => return Err(CircuitError::unsupported(slot.name.clone(), "toggle_switch")),
        };
        self.set_switch_state(id, next)?;
        Ok(next)
    }

    /// Put a switch into the given state and propagate the consequences.
    pub fn set_switch_state(&mut self, id: ComponentId, state: SwitchState) -> Result<()> {
        let slot = self.slot_mut(id)?;
        let Component::Switch(sw) = &mut slot.component else {
            return Err(CircuitError::unsupported(slot.name.clone(), "set_switch_state"));
        };
        sw.set_state(state);
        debug!(component = %slot.name, ?state, "switch state changed");

        match state {
            SwitchState::Open => {
                let broken = if slot.nodes.len() == 2 {
                    sw.pass.break_driven().map(|side| slot.nodes[side.index()])
                } else {
                    None
                };
                if let Some(node) = broken {
                    self.drive(node, 0.0, id);
                }
            }
            SwitchState::Closed => {
                self.evaluate(id);
            }
        }
        self.drain();
        Ok(())
    }

    /// Preset (`true`) or clear (`false`) a flip-flop.
    pub fn force_flip_flop(&mut self, id: ComponentId, q: bool) -> Result<()> {
        let slot = self.slot_mut(id)?;
        let Component::FlipFlop(ff) = &mut slot.component else {
            return Err(CircuitError::unsupported(slot.name.clone(), "force_flip_flop"));
        };
        ff.force(q);
        ff.published = None;
        self.evaluate(id);
        self.drain();
        Ok(())
    }

    // ============ Slot access ============

    pub(crate) fn entry(&self, id: ComponentId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn entry_mut(&mut self, id: ComponentId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn slot(&self, id: ComponentId) -> Result<&Slot> {
        self.entry(id).ok_or(CircuitError::ComponentNotFound { id })
    }

    fn slot_mut(&mut self, id: ComponentId) -> Result<&mut Slot> {
        self.entry_mut(id).ok_or(CircuitError::ComponentNotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GateKind;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_node_dedup_across_components() {
        let mut c = Circuit::new();
        let r1 = c.add(Component::resistor(100.0).unwrap());
        let r2 = c.add(Component::resistor(200.0).unwrap());
        c.connect(r1, &[p(0, 0), p(10, 0)]).unwrap();
        c.connect(r2, &[p(10, 0), p(20, 0)]).unwrap();

        let shared = c.find_node(p(10, 0)).unwrap();
        assert_eq!(c.node_ids(r1)[1], shared);
        assert_eq!(c.node_ids(r2)[0], shared);
        assert_eq!(c.registry().components(shared), &[r1, r2]);
        assert_eq!(c.registry().len(), 3);
    }

    #[test]
    fn test_release_after_last_holder() {
        let mut c = Circuit::new();
        let r1 = c.add(Component::resistor(100.0).unwrap());
        let r2 = c.add(Component::resistor(100.0).unwrap());
        c.connect(r1, &[p(0, 0), p(1, 0)]).unwrap();
        c.connect(r2, &[p(1, 0), p(2, 0)]).unwrap();

        c.disconnect_at(r1, p(1, 0)).unwrap();
        assert!(c.find_node(p(1, 0)).is_some());
        assert!(c.find_node(p(0, 0)).is_some());

        c.disconnect(r2).unwrap();
        assert!(c.find_node(p(1, 0)).is_none());
        assert!(c.find_node(p(2, 0)).is_none());
        assert_eq!(c.node_ids(r1).len(), 1);
    }

    #[test]
    fn test_capacity_violation_is_atomic() {
        let mut c = Circuit::new();
        let r = c.add(Component::resistor(100.0).unwrap());
        c.connect(r, &[p(0, 0), p(1, 0)]).unwrap();

        let err = c.connect(r, &[p(2, 0)]).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::CapacityExceeded {
                capacity: 2,
                requested: 3,
                ..
            }
        ));
        assert_eq!(c.nodes(r).iter().map(|n| n.point).collect::<Vec<_>>(), vec![p(0, 0), p(1, 0)]);
        assert!(c.find_node(p(2, 0)).is_none());
    }

    #[test]
    fn test_single_terminal_capacity() {
        let mut c = Circuit::new();
        let gnd = c.add(Component::ground());
        assert!(c.connect(gnd, &[p(0, 0), p(0, 1)]).is_err());
        assert!(c.node_ids(gnd).is_empty());
        assert!(c.registry().is_empty());
    }

    #[test]
    fn test_reconnect_keeps_pin_position() {
        let mut c = Circuit::new();
        let gate = c.add(Component::gate(GateKind::And));
        c.connect(gate, &[p(0, 0), p(0, 10), p(20, 5)]).unwrap();
        c.reconnect(gate, p(0, 10), p(0, 30)).unwrap();

        let points: Vec<Point> = c.nodes(gate).iter().map(|n| n.point).collect();
        assert_eq!(points, vec![p(0, 0), p(0, 30), p(20, 5)]);
        assert!(c.find_node(p(0, 10)).is_none());
    }

    #[test]
    fn test_reconnect_missing_from_connects() {
        let mut c = Circuit::new();
        let w = c.add(Component::wire());
        c.connect(w, &[p(0, 0)]).unwrap();
        c.reconnect(w, p(99, 99), p(5, 5)).unwrap();
        let points: Vec<Point> = c.nodes(w).iter().map(|n| n.point).collect();
        assert_eq!(points, vec![p(0, 0), p(5, 5)]);
    }

    #[test]
    fn test_reconnect_not_attached_is_noop() {
        let mut c = Circuit::new();
        let r1 = c.add(Component::resistor(1.0).unwrap());
        let r2 = c.add(Component::resistor(1.0).unwrap());
        c.connect(r1, &[p(0, 0), p(1, 0)]).unwrap();
        c.connect(r2, &[p(5, 0), p(6, 0)]).unwrap();
        c.reconnect(r2, p(0, 0), p(9, 9)).unwrap();
        assert!(c.find_node(p(9, 9)).is_none());
        assert_eq!(c.nodes(r2)[0].point, p(5, 0));
    }

    #[test]
    fn test_names_per_kind() {
        let mut c = Circuit::new();
        let r1 = c.add(Component::resistor(1.0).unwrap());
        let w1 = c.add(Component::wire());
        let r2 = c.add(Component::resistor(1.0).unwrap());
        c.remove(r2).unwrap();
        let r3 = c.add(Component::resistor(1.0).unwrap());

        assert_eq!(c.name(r1), Some("R1"));
        assert_eq!(c.name(w1), Some("W1"));
        assert_eq!(c.name(r3), Some("R3"));
        assert!(!c.contains(r2));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_removed_component_errors() {
        let mut c = Circuit::new();
        let w = c.add(Component::wire());
        c.remove(w).unwrap();
        assert!(matches!(
            c.connect(w, &[p(0, 0)]),
            Err(CircuitError::ComponentNotFound { .. })
        ));
        assert_eq!(c.value(w), None);
    }

    #[test]
    fn test_unsupported_setter() {
        let mut c = Circuit::new();
        let w = c.add(Component::wire());
        assert!(matches!(
            c.set_resistance(w, 10.0),
            Err(CircuitError::UnsupportedOperation { .. })
        ));
        assert!(c.tick_clock(w).is_err());
    }

    #[test]
    fn test_rotation_wraps() {
        let mut c = Circuit::new();
        let r = c.add(Component::resistor(1.0).unwrap());
        c.rotate(r, 270).unwrap();
        c.rotate(r, 180).unwrap();
        assert_eq!(c.rotation(r), Some(90));
        c.rotate(r, -180).unwrap();
        assert_eq!(c.rotation(r), Some(270));
    }

    #[test]
    fn test_same_point_twice_holds_node_twice() {
        let mut c = Circuit::new();
        let w = c.add(Component::wire());
        c.connect(w, &[p(0, 0), p(0, 0)]).unwrap();
        let node = c.find_node(p(0, 0)).unwrap();
        assert_eq!(c.registry().get(node).unwrap().holders(), 2);
        assert_eq!(c.registry().components(node), &[w]);

        c.disconnect_at(w, p(0, 0)).unwrap();
        assert!(c.find_node(p(0, 0)).is_none());
        assert!(c.node_ids(w).is_empty());
    }
}
