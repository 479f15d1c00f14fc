//! Shared connection points and the registry that deduplicates them.
//!
//! Every coordinate maps to at most one [`Node`]. Components hold nodes by
//! [`NodeId`]; the registry keeps a holder count per node and drops the node
//! the moment no component holds it any more. The registry's own entry is
//! not counted, so "released" means exactly "only the registry is left".

use std::collections::HashMap;

use super::types::{ComponentId, NodeId, Point};

/// A uniquely addressed connection point.
#[derive(Debug, Clone)]
pub struct Node {
    point: Point,
    /// Cached scalar value (volts)
    pub(crate) value: f64,
    /// Components directly touching this node, in attachment order
    pub(crate) components: Vec<ComponentId>,
    /// Number of component attachments (pins) holding this node
    holders: usize,
}

impl Node {
    fn new(point: Point) -> Self {
        Self {
            point,
            value: 0.0,
            components: Vec::with_capacity(2),
            holders: 0,
        }
    }

    /// Coordinate of this node.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Components directly touching this node.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Number of pins currently holding this node.
    pub fn holders(&self) -> usize {
        self.holders
    }

    /// Check whether a component touches this node.
    pub fn is_connected_to(&self, component: ComponentId) -> bool {
        self.components.contains(&component)
    }

    /// Add a component; attaching the same component twice is a no-op.
    pub(crate) fn add_component(&mut self, component: ComponentId) {
        if !self.is_connected_to(component) {
            self.components.push(component);
        }
    }

    /// Remove a component, returning the position it occupied.
    pub(crate) fn remove_component(&mut self, component: ComponentId) -> Option<usize> {
        let pos = self.components.iter().position(|&c| c == component)?;
        self.components.remove(pos);
        Some(pos)
    }

    /// Put a component back at a previous position.
    pub(crate) fn restore_component(&mut self, component: ComponentId, pos: usize) {
        if !self.is_connected_to(component) {
            let pos = pos.min(self.components.len());
            self.components.insert(pos, component);
        }
    }
}

/// Session-wide collection of live nodes keyed by coordinate.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeId, Node>,
    by_point: HashMap<Point, NodeId>,
    next_id: usize,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the unique node at `point`, creating it if absent.
    pub fn find_or_create(&mut self, point: Point) -> NodeId {
        if let Some(&id) = self.by_point.get(&point) {
            return id;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(point));
        self.by_point.insert(point, id);
        id
    }

    /// Return the node at `point`, if any. Never creates.
    pub fn find(&self, point: Point) -> Option<NodeId> {
        self.by_point.get(&point).copied()
    }

    /// Get a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Check whether a handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Value of a node; released nodes read as 0.
    pub fn value(&self, id: NodeId) -> f64 {
        self.nodes.get(&id).map_or(0.0, |n| n.value)
    }

    /// Set the value of a live node.
    pub(crate) fn set_value(&mut self, id: NodeId, value: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.value = value;
        }
    }

    /// Coordinate of a node.
    pub fn point(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(&id).map(|n| n.point)
    }

    /// Components directly touching a node (empty for released nodes).
    pub fn components(&self, id: NodeId) -> &[ComponentId] {
        self.nodes.get(&id).map(|n| n.components.as_slice()).unwrap_or(&[])
    }

    /// Attach one pin of `component` at `point`.
    pub(crate) fn attach(&mut self, point: Point, component: ComponentId) -> NodeId {
        let id = self.find_or_create(point);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.holders += 1;
            node.add_component(component);
        }
        id
    }

    /// Detach one pin of `component` from `id`.
    ///
    /// `still_pinned` is whether the component keeps another pin on the same
    /// node; it then stays in the node's component list. Returns `true` when
    /// the node was released.
    pub(crate) fn detach(&mut self, id: NodeId, component: ComponentId, still_pinned: bool) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.holders = node.holders.saturating_sub(1);
        if !still_pinned {
            node.remove_component(component);
        }
        self.release(id)
    }

    /// Remove a node from the registry once no component holds it.
    ///
    /// Returns `true` if the node was removed.
    pub fn release(&mut self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) if node.holders == 0 => {
                let point = node.point;
                self.nodes.remove(&id);
                self.by_point.remove(&point);
                true
            }
            _ => false,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the registry holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_dedups() {
        let mut reg = NodeRegistry::new();
        let a = reg.find_or_create(Point::new(10, 20));
        let b = reg.find_or_create(Point::new(10, 20));
        let c = reg.find_or_create(Point::new(20, 10));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_find_never_creates() {
        let reg = NodeRegistry::new();
        assert!(reg.find(Point::new(0, 0)).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_attach_is_idempotent_per_component() {
        let mut reg = NodeRegistry::new();
        let p = Point::new(1, 1);
        let id = reg.attach(p, ComponentId(0));
        reg.attach(p, ComponentId(0));
        reg.attach(p, ComponentId(1));

        let node = reg.get(id).unwrap();
        assert_eq!(node.components(), &[ComponentId(0), ComponentId(1)]);
        assert_eq!(node.holders(), 3);
    }

    #[test]
    fn test_release_only_after_last_holder() {
        let mut reg = NodeRegistry::new();
        let p = Point::new(5, 5);
        let id = reg.attach(p, ComponentId(0));
        reg.attach(p, ComponentId(1));

        assert!(!reg.detach(id, ComponentId(0), false));
        assert_eq!(reg.find(p), Some(id));

        assert!(reg.detach(id, ComponentId(1), false));
        assert!(reg.find(p).is_none());
        assert!(!reg.contains(id));
    }

    #[test]
    fn test_release_keeps_held_node() {
        let mut reg = NodeRegistry::new();
        let id = reg.attach(Point::new(0, 0), ComponentId(3));
        assert!(!reg.release(id));
        assert!(reg.contains(id));
    }

    #[test]
    fn test_restore_component_keeps_order() {
        let mut node = Node::new(Point::new(0, 0));
        node.add_component(ComponentId(0));
        node.add_component(ComponentId(1));
        node.add_component(ComponentId(2));

        let pos = node.remove_component(ComponentId(1)).unwrap();
        assert_eq!(node.components(), &[ComponentId(0), ComponentId(2)]);
        node.restore_component(ComponentId(1), pos);
        assert_eq!(
            node.components(),
            &[ComponentId(0), ComponentId(1), ComponentId(2)]
        );
    }

    #[test]
    fn test_released_node_reads_zero() {
        let mut reg = NodeRegistry::new();
        let id = reg.attach(Point::new(2, 2), ComponentId(0));
        reg.set_value(id, 3.3);
        assert_eq!(reg.value(id), 3.3);
        reg.detach(id, ComponentId(0), false);
        assert_eq!(reg.value(id), 0.0);
        assert!(reg.components(id).is_empty());
    }
}
