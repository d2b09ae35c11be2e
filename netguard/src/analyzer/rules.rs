use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analyzer::pin_matrix::{ElectricalPinType, PinConflictMatrix, PinConflictSeverity};
use crate::connectivity::geometry::{points_equal, TOLERANCE};
use crate::connectivity::{NetAnalysis, PinConnection};
use crate::schematic::{Position, Schematic};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErcCode {
    PinConflictError,
    PinConflictWarning,
    UnconnectedPin,
    DuplicateReference,
    OffGrid,
    OffGridWire,
    MissingFootprint,
    MissingValue,
    FloatingLabel,
}

impl ErcCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErcCode::PinConflictError => "PIN_CONFLICT_ERROR",
            ErcCode::PinConflictWarning => "PIN_CONFLICT_WARNING",
            ErcCode::UnconnectedPin => "UNCONNECTED_PIN",
            ErcCode::DuplicateReference => "DUPLICATE_REFERENCE",
            ErcCode::OffGrid => "OFF_GRID",
            ErcCode::OffGridWire => "OFF_GRID_WIRE",
            ErcCode::MissingFootprint => "MISSING_FOOTPRINT",
            ErcCode::MissingValue => "MISSING_VALUE",
            ErcCode::FloatingLabel => "FLOATING_LABEL",
        }
    }
}

impl std::fmt::Display for ErcCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErcViolation {
    pub id: String,
    pub code: ErcCode,
    pub severity: Severity,
    pub message: String,
    pub component: Option<String>,
    pub location: Option<Position>,
}

impl ErcViolation {
    pub fn new(code: ErcCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code,
            severity,
            message: message.into(),
            component: None,
            location: None,
        }
    }

    pub fn with_component(mut self, reference: impl Into<String>) -> Self {
        self.component = Some(reference.into());
        self
    }

    pub fn at(mut self, location: Position) -> Self {
        self.location = Some(location);
        self
    }
}

/// Inputs shared by every rule in one ERC run.
///
/// `pins` holds every declared pin of every component, all units included.
/// `analysis` and `pins` are `None` when net analysis failed; rules that
/// depend on them report nothing in that case.
pub struct RuleContext<'a> {
    pub schematic: &'a Schematic,
    pub analysis: Option<&'a NetAnalysis>,
    pub pins: Option<&'a [PinConnection]>,
    pub grid_size: f64,
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation>;
}

// Helper functions

fn is_off_grid(value: f64, grid_size: f64) -> bool {
    if grid_size <= 0.0 {
        return false;
    }
    let nearest = (value / grid_size).round() * grid_size;
    (value - nearest).abs() > TOLERANCE
}

fn on_wire_vertex(schematic: &Schematic, point: &Position) -> bool {
    schematic
        .wires
        .iter()
        .any(|w| w.points.iter().any(|p| points_equal(p, point)))
}

// Rule implementations

pub struct PinConflictRule {
    matrix: PinConflictMatrix,
}

impl PinConflictRule {
    pub fn new() -> Self {
        Self {
            matrix: PinConflictMatrix::new(),
        }
    }
}

impl Default for PinConflictRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PinConflictRule {
    fn id(&self) -> &str {
        "pin_conflict"
    }

    fn name(&self) -> &str {
        "Pin Type Conflict Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        let mut violations = Vec::new();
        let Some(analysis) = ctx.analysis else {
            return violations;
        };

        for net in analysis.nets.iter().filter(|n| n.pins.len() >= 2) {
            for (i, a) in net.pins.iter().enumerate() {
                for b in &net.pins[i + 1..] {
                    let (code, severity) = match self.matrix.check(a.electrical_type, b.electrical_type) {
                        PinConflictSeverity::Ok => continue,
                        PinConflictSeverity::Warning => (ErcCode::PinConflictWarning, Severity::Warning),
                        PinConflictSeverity::Error => (ErcCode::PinConflictError, Severity::Error),
                    };
                    violations.push(
                        ErcViolation::new(
                            code,
                            severity,
                            format!(
                                "Pin conflict on net {}: {} pin {} ({}) and {} pin {} ({})",
                                net.name,
                                a.reference,
                                a.pin,
                                a.electrical_type,
                                b.reference,
                                b.pin,
                                b.electrical_type
                            ),
                        )
                        .with_component(a.reference.clone())
                        .at(a.position),
                    );
                }
            }
        }

        violations
    }
}

/// Flags declared pins that appear in no extracted net.
///
/// Pins of units that are not placed never reach a net, so a multi-unit
/// symbol placed once reports the pins of its other units.
pub struct UnconnectedPinRule;

impl Rule for UnconnectedPinRule {
    fn id(&self) -> &str {
        "unconnected_pin"
    }

    fn name(&self) -> &str {
        "Unconnected Pin Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        let (Some(analysis), Some(pins)) = (ctx.analysis, ctx.pins) else {
            return Vec::new();
        };

        let in_nets: HashSet<String> = analysis
            .nets
            .iter()
            .flat_map(|n| n.pins.iter().map(PinConnection::key))
            .collect();

        let mut reported = HashSet::new();
        pins.iter()
            .filter(|p| p.electrical_type != ElectricalPinType::NoConnect)
            .filter(|p| {
                let key = p.key();
                !in_nets.contains(&key) && reported.insert(key)
            })
            .map(|p| {
                ErcViolation::new(
                    ErcCode::UnconnectedPin,
                    Severity::Warning,
                    format!("Pin {} of {} is not connected", p.pin, p.reference),
                )
                .with_component(p.reference.clone())
                .at(p.position)
            })
            .collect()
    }
}

pub struct DuplicateReferenceRule;

impl Rule for DuplicateReferenceRule {
    fn id(&self) -> &str {
        "duplicate_reference"
    }

    fn name(&self) -> &str {
        "Duplicate Reference Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut violations = Vec::new();

        for component in &ctx.schematic.components {
            let reference = component.reference.as_str();
            if reference.is_empty() || reference.starts_with('#') {
                continue;
            }
            if !seen.insert(reference) {
                violations.push(
                    ErcViolation::new(
                        ErcCode::DuplicateReference,
                        Severity::Error,
                        format!("Duplicate reference designator: {}", reference),
                    )
                    .with_component(reference)
                    .at(component.position),
                );
            }
        }

        violations
    }
}

pub struct OffGridRule;

impl Rule for OffGridRule {
    fn id(&self) -> &str {
        "off_grid"
    }

    fn name(&self) -> &str {
        "Grid Alignment Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        let grid = ctx.grid_size;
        let off = |p: &Position| is_off_grid(p.x, grid) || is_off_grid(p.y, grid);
        let mut violations = Vec::new();

        for component in ctx.schematic.components.iter().filter(|c| off(&c.position)) {
            violations.push(
                ErcViolation::new(
                    ErcCode::OffGrid,
                    Severity::Warning,
                    format!(
                        "{} at ({:.2}, {:.2}) is not on the {} grid",
                        component.reference, component.position.x, component.position.y, grid
                    ),
                )
                .with_component(component.reference.clone())
                .at(component.position),
            );
        }

        for wire in &ctx.schematic.wires {
            for point in wire.points.iter().filter(|p| off(p)) {
                violations.push(
                    ErcViolation::new(
                        ErcCode::OffGridWire,
                        Severity::Warning,
                        format!("Wire point ({:.2}, {:.2}) is not on the {} grid", point.x, point.y, grid),
                    )
                    .at(*point),
                );
            }
        }

        violations
    }
}

pub struct MissingFootprintRule;

impl Rule for MissingFootprintRule {
    fn id(&self) -> &str {
        "missing_footprint"
    }

    fn name(&self) -> &str {
        "Missing Footprint Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        ctx.schematic
            .components
            .iter()
            .filter(|c| !c.is_power_symbol())
            .filter(|c| c.footprint.as_deref().map_or(true, |f| f.trim().is_empty()))
            .map(|c| {
                ErcViolation::new(
                    ErcCode::MissingFootprint,
                    Severity::Warning,
                    format!("{} has no footprint assigned", c.reference),
                )
                .with_component(c.reference.clone())
                .at(c.position)
            })
            .collect()
    }
}

pub struct MissingValueRule;

impl Rule for MissingValueRule {
    fn id(&self) -> &str {
        "missing_value"
    }

    fn name(&self) -> &str {
        "Missing Value Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        ctx.schematic
            .components
            .iter()
            .filter(|c| !c.is_power_symbol())
            .filter(|c| {
                let value = c.value.trim();
                value.is_empty() || value == "~"
            })
            .map(|c| {
                ErcViolation::new(
                    ErcCode::MissingValue,
                    Severity::Info,
                    format!("{} has no value", c.reference),
                )
                .with_component(c.reference.clone())
                .at(c.position)
            })
            .collect()
    }
}

/// Labels must sit on a wire vertex. Mid-segment labels still join the net
/// during extraction but are reported here.
///
/// A vertex matches within the shared 0.01 point tolerance, not by exact
/// float equality, so a label snapped to the same [`PointKey`] as the
/// vertex is never reported.
///
/// [`PointKey`]: crate::connectivity::PointKey
pub struct FloatingLabelRule;

impl Rule for FloatingLabelRule {
    fn id(&self) -> &str {
        "floating_label"
    }

    fn name(&self) -> &str {
        "Floating Label Check"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ErcViolation> {
        ctx.schematic
            .labels
            .iter()
            .filter(|l| !on_wire_vertex(ctx.schematic, &l.position))
            .map(|l| {
                ErcViolation::new(
                    ErcCode::FloatingLabel,
                    Severity::Warning,
                    format!(
                        "Label '{}' at ({:.2}, {:.2}) is not connected to a wire",
                        l.text, l.position.x, l.position.y
                    ),
                )
                .at(l.position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::{Component, Label, LabelType, Wire};

    fn context(schematic: &Schematic) -> RuleContext<'_> {
        RuleContext {
            schematic,
            analysis: None,
            pins: None,
            grid_size: 1.27,
        }
    }

    #[test]
    fn test_is_off_grid() {
        assert!(!is_off_grid(2.54, 1.27));
        assert!(!is_off_grid(-12.7, 1.27));
        assert!(!is_off_grid(127.005, 1.27));
        assert!(is_off_grid(100.5, 1.27));
        assert!(!is_off_grid(3.3, 0.0));
    }

    #[test]
    fn test_duplicate_reference_ignores_power_refs() {
        let schematic = Schematic {
            components: vec![
                Component::new("R1", "Device:R", Position::new(0.0, 0.0)),
                Component::new("R1", "Device:R", Position::new(2.54, 0.0)),
                Component::new("R1", "Device:R", Position::new(5.08, 0.0)),
                Component::new("#PWR01", "power:GND", Position::new(0.0, 0.0)),
                Component::new("#PWR01", "power:GND", Position::new(0.0, 0.0)),
                Component::new("", "Device:R", Position::new(0.0, 0.0)),
                Component::new("", "Device:R", Position::new(0.0, 0.0)),
            ],
            ..Default::default()
        };

        let violations = DuplicateReferenceRule.check(&context(&schematic));
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.code == ErcCode::DuplicateReference));
        assert!(violations.iter().all(|v| v.severity == Severity::Error));
    }

    #[test]
    fn test_missing_value_and_footprint_skip_power_symbols() {
        let schematic = Schematic {
            components: vec![
                Component::new("R1", "Device:R", Position::new(0.0, 0.0)).with_value("~"),
                Component::new("R2", "Device:R", Position::new(0.0, 0.0))
                    .with_value("10k")
                    .with_footprint("Resistor_SMD:R_0603"),
                Component::new("#PWR01", "power:GND", Position::new(0.0, 0.0)),
            ],
            ..Default::default()
        };
        let ctx = context(&schematic);

        let values = MissingValueRule.check(&ctx);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].component.as_deref(), Some("R1"));
        assert_eq!(values[0].severity, Severity::Info);

        let footprints = MissingFootprintRule.check(&ctx);
        assert_eq!(footprints.len(), 1);
        assert_eq!(footprints[0].component.as_deref(), Some("R1"));
    }

    #[test]
    fn test_floating_label_is_vertex_only() {
        let schematic = Schematic {
            wires: vec![Wire::new(vec![Position::new(0.0, 0.0), Position::new(10.16, 0.0)])],
            labels: vec![
                Label::new("ON_VERTEX", Position::new(10.16, 0.0), LabelType::Global),
                Label::new("MID_WIRE", Position::new(5.08, 0.0), LabelType::Local),
                Label::new("NOWHERE", Position::new(50.8, 50.8), LabelType::Local),
            ],
            ..Default::default()
        };

        let violations = FloatingLabelRule.check(&context(&schematic));
        let texts: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(violations.len(), 2);
        assert!(texts[0].contains("MID_WIRE"));
        assert!(texts[1].contains("NOWHERE"));
    }

    #[test]
    fn test_floating_label_vertex_match_uses_tolerance() {
        let schematic = Schematic {
            wires: vec![Wire::new(vec![Position::new(0.0, 0.0), Position::new(10.16, 0.0)])],
            labels: vec![
                Label::new("NEAR", Position::new(10.165, 0.0), LabelType::Local),
                Label::new("OFF", Position::new(10.2, 0.0), LabelType::Local),
            ],
            ..Default::default()
        };

        let violations = FloatingLabelRule.check(&context(&schematic));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("OFF"));
    }

    #[test]
    fn test_net_rules_report_nothing_without_analysis() {
        let schematic = Schematic::default();
        let ctx = context(&schematic);
        assert!(PinConflictRule::new().check(&ctx).is_empty());
        assert!(UnconnectedPinRule.check(&ctx).is_empty());
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErcCode::OffGridWire).unwrap();
        assert_eq!(json, "\"OFF_GRID_WIRE\"");
        assert_eq!(ErcCode::PinConflictError.to_string(), "PIN_CONFLICT_ERROR");
    }
}
