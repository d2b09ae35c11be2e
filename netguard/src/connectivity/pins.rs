//! Pin-Position Resolver
//!
//! Maps a placed component's symbol pins into schematic space. Symbol
//! coordinates are y-up while the sheet is y-down, so the symbol y is
//! negated before mirroring, rotating and translating.

use serde::{Deserialize, Serialize};

use crate::analyzer::pin_matrix::ElectricalPinType;
use crate::schematic::{Component, LibraryError, MirrorAxis, Position, SymbolLookup, SymbolPin};

/// A component pin resolved into schematic coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinConnection {
    pub reference: String,
    pub pin: String,
    pub position: Position,
    #[serde(default)]
    pub electrical_type: ElectricalPinType,
}

impl PinConnection {
    /// `"{reference}-{pin}"`, the identity ERC uses for pins.
    pub fn key(&self) -> String {
        format!("{}-{}", self.reference, self.pin)
    }
}

/// Transform a symbol-space point into schematic space for `component`.
pub fn transform_pin_position(component: &Component, symbol_position: &Position) -> Position {
    let mut x = symbol_position.x;
    let mut y = -symbol_position.y;

    match component.mirror {
        Some(MirrorAxis::X) => y = -y,
        Some(MirrorAxis::Y) => x = -x,
        None => {}
    }

    let (sin, cos) = component.rotation.to_radians().sin_cos();
    let rotated_x = x * cos - y * sin;
    let rotated_y = x * sin + y * cos;

    Position::new(component.position.x + rotated_x, component.position.y + rotated_y)
}

/// Resolve the pins placed by `component`'s unit.
///
/// Without a usable symbol, each declared pin number sits at the component
/// origin with an unspecified electrical type.
pub fn resolve_component_pins(
    component: &Component,
    symbols: &dyn SymbolLookup,
) -> Result<Vec<PinConnection>, LibraryError> {
    let symbol = symbols.get_symbol(&component.lib_id)?;
    let resolved = symbol
        .as_deref()
        .map(|symbol| place_pins(component, symbol.pins_for_unit(component.unit)))
        .unwrap_or_default();

    Ok(or_declared_pins(component, resolved))
}

/// Every pin the symbol declares, across all of its units.
///
/// Pins of units other than the placed one are still transformed with the
/// component's placement. Falls back the same way as
/// [`resolve_component_pins`].
pub fn declared_component_pins(
    component: &Component,
    symbols: &dyn SymbolLookup,
) -> Result<Vec<PinConnection>, LibraryError> {
    let symbol = symbols.get_symbol(&component.lib_id)?;
    let declared = symbol
        .as_deref()
        .map(|symbol| place_pins(component, symbol.all_pins()))
        .unwrap_or_default();

    Ok(or_declared_pins(component, declared))
}

fn place_pins<'s>(component: &Component, pins: impl Iterator<Item = &'s SymbolPin>) -> Vec<PinConnection> {
    pins.map(|pin| PinConnection {
        reference: component.reference.clone(),
        pin: pin.number.clone(),
        position: transform_pin_position(component, &pin.position),
        electrical_type: pin.electrical_type,
    })
    .collect()
}

fn or_declared_pins(component: &Component, resolved: Vec<PinConnection>) -> Vec<PinConnection> {
    if !resolved.is_empty() {
        return resolved;
    }

    if !component.pins.is_empty() {
        tracing::debug!(
            "No symbol pins for {} ({}), placing {} declared pins at origin",
            component.reference,
            component.lib_id,
            component.pins.len()
        );
    }

    component
        .pins
        .iter()
        .map(|pin| PinConnection {
            reference: component.reference.clone(),
            pin: pin.number.clone(),
            position: component.position,
            electrical_type: ElectricalPinType::Unspecified,
        })
        .collect()
}
