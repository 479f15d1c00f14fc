//! Persisted layout documents.
//!
//! A layout is a JSON object keyed by component type tag; each entry is an
//! array of records holding the connection points and kind parameters of
//! one component:
//!
//! ```json
//! {
//!   "resistor": [{ "points": [{"x": 0, "y": 0}, {"x": 0, "y": 100}], "resistance": 1000.0 }],
//!   "switch":   [{ "points": [{"x": 0, "y": 0}, {"x": 100, "y": 0}], "open": true }]
//! }
//! ```
//!
//! Writing files is left to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::CircuitConfig;
use super::graph::Circuit;
use super::types::Point;
use crate::components::{Component, ComponentKind, SwitchState, DEFAULT_HIGH};
use crate::error::{CircuitError, Result};

/// Half period given to clocks whose record carries none.
pub const DEFAULT_CLOCK_INTERVAL_MS: u64 = 1000;

/// One persisted component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Connection points in pin order
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rotation: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// A whole layout, grouped by type tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutDocument {
    pub components: BTreeMap<String, Vec<LayoutRecord>>,
}

impl LayoutDocument {
    /// Parse a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a layout file.
    #[cfg(feature = "cli")]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CircuitError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Render the layout as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    /// Check whether the layout holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Circuit {
    /// Capture every live component as a layout record.
    pub fn to_layout(&self) -> LayoutDocument {
        let mut doc = LayoutDocument::default();
        for id in self.ids() {
            let Some(slot) = self.entry(id) else {
                continue;
            };
            let mut record = LayoutRecord {
                points: self.nodes(id).iter().map(|n| n.point).collect(),
                rotation: slot.rotation,
                ..LayoutRecord::default()
            };
            match &slot.component {
                Component::Resistor(r) => record.resistance = Some(r.resistance()),
                Component::DcVoltage(u) => record.voltage = Some(u.voltage()),
                Component::Clock(c) => {
                    record.voltage = Some(c.amplitude());
                    record.interval_ms = Some(c.interval_ms());
                }
                Component::Switch(s) => record.open = Some(s.is_open()),
                _ => {}
            }
            doc.components
                .entry(slot.component.kind().tag().to_string())
                .or_default()
                .push(record);
        }
        doc
    }

    /// Build a circuit from a layout through the ordinary editing entry
    /// points.
    pub fn from_layout(doc: &LayoutDocument, config: CircuitConfig) -> Result<Self> {
        let mut circuit = Circuit::with_config(config);
        for (tag, records) in &doc.components {
            let kind = ComponentKind::from_tag(tag).ok_or_else(|| {
                CircuitError::UnknownComponentType {
                    type_tag: tag.clone(),
                }
            })?;
            for record in records {
                let component = build_component(kind, record)?;
                let id = circuit.add(component);
                if record.rotation != 0 {
                    circuit.rotate(id, record.rotation)?;
                }
                circuit.connect(id, &record.points)?;
            }
        }
        debug!(components = circuit.len(), "layout loaded");
        Ok(circuit)
    }
}

fn build_component(kind: ComponentKind, record: &LayoutRecord) -> Result<Component> {
    if let Some(gate) = kind.gate_kind() {
        return Ok(Component::gate(gate));
    }
    match kind {
        ComponentKind::Ground => Ok(Component::ground()),
        ComponentKind::DcVoltage => Component::dc_voltage(record.voltage.unwrap_or(0.0)),
        ComponentKind::Clock => Component::clock(
            record.voltage.unwrap_or(DEFAULT_HIGH),
            record.interval_ms.unwrap_or(DEFAULT_CLOCK_INTERVAL_MS),
        ),
        ComponentKind::Resistor => {
            let resistance = record.resistance.ok_or_else(|| {
                CircuitError::invalid_parameter("resistor", "resistance", "missing from layout record")
            })?;
            Component::resistor(resistance)
        }
        ComponentKind::Wire => Ok(Component::wire()),
        ComponentKind::Switch => Ok(Component::switch(SwitchState::from_open(
            record.open.unwrap_or(false),
        ))),
        ComponentKind::FlipFlop => Ok(Component::flip_flop()),
        ComponentKind::Decoder => Ok(Component::decoder()),
        ComponentKind::Display => Ok(Component::display()),
        _ => Err(CircuitError::UnknownComponentType {
            type_tag: kind.tag().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = LayoutDocument::from_json(
            r#"{
                "voltage": [{ "points": [{"x": 0, "y": 0}], "voltage": 5.0 }],
                "wire": [{ "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}] }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.len(), 2);

        let mut c = Circuit::from_layout(&doc, CircuitConfig::default()).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.node_value(Point::new(10, 0)), Some(5.0));
        assert_eq!(c.components_at(Point::new(10, 0)).len(), 1);
    }

    #[test]
    fn test_unknown_tag() {
        let doc = LayoutDocument::from_json(r#"{ "transistor": [] }"#).unwrap();
        assert!(matches!(
            Circuit::from_layout(&doc, CircuitConfig::default()),
            Err(CircuitError::UnknownComponentType { .. })
        ));
    }

    #[test]
    fn test_missing_resistance() {
        let doc = LayoutDocument::from_json(
            r#"{ "resistor": [{ "points": [{"x": 0, "y": 0}, {"x": 0, "y": 1}] }] }"#,
        )
        .unwrap();
        assert!(matches!(
            Circuit::from_layout(&doc, CircuitConfig::default()),
            Err(CircuitError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LayoutDocument::from_json("{ \"wire\": 3 }"),
            Err(CircuitError::LayoutFormat(_))
        ));
    }

    #[test]
    fn test_defaults_are_omitted() {
        let mut c = Circuit::new();
        let w = c.add(Component::wire());
        c.connect(w, &[Point::new(1, 2)]).unwrap();
        let json = c.to_layout().to_json().unwrap();
        assert!(!json.contains("rotation"));
        assert!(!json.contains("resistance"));
        assert!(json.contains("\"wire\""));
    }
}
