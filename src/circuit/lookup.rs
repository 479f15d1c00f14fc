//! Component lookup by coordinate, looking through wires.

use super::graph::Circuit;
use super::types::{ComponentId, NodeId, Point};
use crate::components::ComponentKind;

impl Circuit {
    /// Components reachable from `node` through any chain of wires.
    ///
    /// Wires themselves are not reported. Switches and every other kind
    /// stop the walk. Results are de-duplicated in first-seen order.
    pub fn components_visible_from(&mut self, node: NodeId) -> Vec<ComponentId> {
        let mut found = Vec::new();
        self.collect_visible(node, &mut found);
        found
    }

    fn collect_visible(&mut self, node: NodeId, found: &mut Vec<ComponentId>) {
        let direct = self.registry.components(node).to_vec();
        for id in direct {
            if self.kind(id) != Some(ComponentKind::Wire) {
                if !found.contains(&id) {
                    found.push(id);
                }
                continue;
            }

            let far = self
                .node_ids(id)
                .iter()
                .copied()
                .find(|&n| n != node);
            if let Some(far) = far {
                self.with_edge_detached(id, |circuit| circuit.collect_visible(far, found));
            }
        }
    }

    /// Run `f` with `wire` taken out of the component lists of its nodes,
    /// putting it back at the same positions afterwards.
    pub(crate) fn with_edge_detached<R>(
        &mut self,
        wire: ComponentId,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let nodes = self.node_ids(wire).to_vec();
        let mut removed = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(pos) = self
                .registry
                .get_mut(node)
                .and_then(|n| n.remove_component(wire))
            {
                removed.push((node, pos));
            }
        }

        let result = f(self);

        for (node, pos) in removed.into_iter().rev() {
            if let Some(n) = self.registry.get_mut(node) {
                n.restore_component(wire, pos);
            }
        }
        result
    }

    /// Components visible from the node at `point`.
    pub fn components_at(&mut self, point: Point) -> Vec<ComponentId> {
        match self.registry.find(point) {
            Some(node) => self.components_visible_from(node),
            None => Vec::new(),
        }
    }

    /// Components attached directly to the node at `point`, wires included.
    pub fn direct_components_at(&self, point: Point) -> Vec<ComponentId> {
        self.registry
            .find(point)
            .map(|node| self.registry.components(node).to_vec())
            .unwrap_or_default()
    }

    /// First component of `kind` visible from `point`.
    pub fn find(&mut self, kind: ComponentKind, point: Point) -> Option<ComponentId> {
        self.components_at(point)
            .into_iter()
            .find(|&id| self.kind(id) == Some(kind))
    }

    /// First component of `kind` attached directly at `point`.
    pub fn find_directly_connected(&self, kind: ComponentKind, point: Point) -> Option<ComponentId> {
        self.direct_components_at(point)
            .into_iter()
            .find(|&id| self.kind(id) == Some(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Component, SwitchState};

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_looks_through_wires() {
        let mut c = Circuit::new();
        let r = c.add(Component::resistor(10.0).unwrap());
        let w1 = c.add(Component::wire());
        let w2 = c.add(Component::wire());
        let gnd = c.add(Component::ground());
        c.connect(r, &[p(0, 0), p(0, 10)]).unwrap();
        c.connect(w1, &[p(0, 10), p(10, 10)]).unwrap();
        c.connect(w2, &[p(10, 10), p(20, 10)]).unwrap();
        c.connect(gnd, &[p(20, 10)]).unwrap();

        assert_eq!(c.components_at(p(0, 10)), vec![r, gnd]);
        assert_eq!(c.find(ComponentKind::Ground, p(0, 10)), Some(gnd));
        assert_eq!(c.find_directly_connected(ComponentKind::Ground, p(0, 10)), None);
        assert_eq!(c.direct_components_at(p(10, 10)), vec![w1, w2]);
    }

    #[test]
    fn test_switch_is_boundary() {
        let mut c = Circuit::new();
        let s = c.add(Component::switch(SwitchState::Closed));
        let gnd = c.add(Component::ground());
        c.connect(s, &[p(0, 0), p(10, 0)]).unwrap();
        c.connect(gnd, &[p(10, 0)]).unwrap();
        assert_eq!(c.components_at(p(0, 0)), vec![s]);
    }

    #[test]
    fn test_wire_loop_terminates_and_restores() {
        let mut c = Circuit::new();
        let gnd = c.add(Component::ground());
        let w1 = c.add(Component::wire());
        let w2 = c.add(Component::wire());
        let w3 = c.add(Component::wire());
        c.connect(gnd, &[p(0, 0)]).unwrap();
        c.connect(w1, &[p(0, 0), p(10, 0)]).unwrap();
        c.connect(w2, &[p(10, 0), p(10, 10)]).unwrap();
        c.connect(w3, &[p(10, 10), p(0, 0)]).unwrap();

        assert_eq!(c.components_at(p(10, 0)), vec![gnd]);
        assert_eq!(c.direct_components_at(p(0, 0)), vec![gnd, w1, w3]);
        assert_eq!(c.direct_components_at(p(10, 0)), vec![w1, w2]);
        assert_eq!(c.direct_components_at(p(10, 10)), vec![w2, w3]);
    }

    #[test]
    fn test_unknown_point_is_empty() {
        let mut c = Circuit::new();
        assert!(c.components_at(p(5, 5)).is_empty());
        assert!(c.direct_components_at(p(5, 5)).is_empty());
        assert_eq!(c.find(ComponentKind::Wire, p(5, 5)), None);
    }
}
