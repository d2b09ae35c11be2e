use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::NetguardError;

/// Read-only snapshot of one schematic sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schematic {
    pub uuid: String,
    pub filename: String,
    pub components: Vec<Component>,
    pub wires: Vec<Wire>,
    pub junctions: Vec<Junction>,
    pub labels: Vec<Label>,
}

impl Schematic {
    pub fn from_json_str(json: &str) -> Result<Self, NetguardError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: &Path) -> Result<Self, NetguardError> {
        let content = std::fs::read_to_string(path)?;
        let schematic = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded schematic {} ({} components, {} wires, {} labels)",
            path.display(),
            schematic.components.len(),
            schematic.wires.len(),
            schematic.labels.len()
        );
        Ok(schematic)
    }

    /// Labels of one kind, in sheet order.
    pub fn labels_of_type(&self, label_type: LabelType) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(move |l| l.label_type == label_type)
    }

    pub fn power_symbols(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_power_symbol())
    }

    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.reference == reference)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub uuid: String,
    pub reference: String,   // R1, C1, U1, #PWR01
    pub value: String,       // 10k, 100nF, GND
    pub lib_id: String,      // Device:R, power:GND
    pub footprint: Option<String>,
    pub position: Position,
    pub rotation: f64,       // Rotation in degrees
    pub mirror: Option<MirrorAxis>,
    pub unit: u32,
    pub properties: HashMap<String, String>,
    pub pins: Vec<Pin>,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            reference: String::new(),
            value: String::new(),
            lib_id: String::new(),
            footprint: None,
            position: Position::default(),
            rotation: 0.0,
            mirror: None,
            unit: 1,
            properties: HashMap::new(),
            pins: Vec::new(),
        }
    }
}

impl Component {
    pub fn new(reference: impl Into<String>, lib_id: impl Into<String>, position: Position) -> Self {
        Self {
            reference: reference.into(),
            lib_id: lib_id.into(),
            position,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = Some(footprint.into());
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mirror(mut self, mirror: MirrorAxis) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_pins<I, S>(mut self, numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pins.extend(numbers.into_iter().map(|n| Pin {
            number: n.into(),
            uuid: String::new(),
        }));
        self
    }

    /// Power symbols stand for an implicit global net named by their value.
    pub fn is_power_symbol(&self) -> bool {
        let lib = self.lib_id.to_ascii_lowercase();
        lib.starts_with("power:")
            || self.reference.starts_with("#PWR")
            || self.reference.starts_with("#FLG")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis a symbol is mirrored about: `X` flips y, `Y` flips x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorAxis {
    X,
    Y,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pin {
    pub number: String,
    #[serde(default)]
    pub uuid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wire {
    #[serde(default)]
    pub uuid: String,
    pub points: Vec<Position>,
}

impl Wire {
    pub fn new(points: Vec<Position>) -> Self {
        Self {
            uuid: String::new(),
            points,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Junction {
    #[serde(default)]
    pub uuid: String,
    pub position: Position,
}

impl Junction {
    pub fn at(position: Position) -> Self {
        Self {
            uuid: String::new(),
            position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub uuid: String,
    pub text: String,
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub label_type: LabelType,
}

impl Label {
    pub fn new(text: impl Into<String>, position: Position, label_type: LabelType) -> Self {
        Self {
            uuid: String::new(),
            text: text.into(),
            position,
            rotation: 0.0,
            label_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LabelType {
    #[default]
    Local,
    Global,
    Hierarchical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_symbol_detection() {
        let gnd = Component::new("#PWR01", "power:GND", Position::new(0.0, 0.0)).with_value("GND");
        let flag = Component::new("#FLG01", "Custom:Flag", Position::new(0.0, 0.0));
        let r1 = Component::new("R1", "Device:R", Position::new(0.0, 0.0));

        assert!(gnd.is_power_symbol());
        assert!(flag.is_power_symbol());
        assert!(!r1.is_power_symbol());
    }

    #[test]
    fn test_schematic_from_json_defaults() {
        let json = r#"{
            "components": [
                {"reference": "R1", "lib_id": "Device:R", "position": {"x": 1.27, "y": 2.54}, "mirror": "y"}
            ],
            "wires": [{"points": [{"x": 0.0, "y": 0.0}, {"x": 10.0, "y": 0.0}]}],
            "labels": [{"text": "VCC", "position": {"x": 0.0, "y": 0.0}, "label_type": "Global"}]
        }"#;

        let schematic = Schematic::from_json_str(json).expect("valid schematic json");
        assert_eq!(schematic.components.len(), 1);
        assert_eq!(schematic.components[0].mirror, Some(MirrorAxis::Y));
        assert!(schematic.junctions.is_empty());
        assert_eq!(schematic.labels[0].label_type, LabelType::Global);
        assert_eq!(schematic.labels_of_type(LabelType::Local).count(), 0);
    }
}
