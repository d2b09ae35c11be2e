//! Symbol library lookup
//!
//! The connectivity and ERC passes never load libraries themselves; they
//! receive a [`SymbolLookup`] from the caller. [`SymbolLibrary`] is the
//! in-memory implementation used by hosts that already resolved inheritance.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::schema::Position;
use crate::analyzer::pin_matrix::ElectricalPinType;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid symbol library: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Symbol lookup failed for {lib_id}: {reason}")]
    Lookup { lib_id: String, reason: String },
}

/// A pin as drawn in the symbol editor (y-up coordinates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolPin {
    pub number: String,
    #[serde(default)]
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, deserialize_with = "deserialize_pin_type")]
    pub electrical_type: ElectricalPinType,
}

impl SymbolPin {
    pub fn new(number: impl Into<String>, position: Position, electrical_type: ElectricalPinType) -> Self {
        Self {
            number: number.into(),
            name: String::new(),
            position,
            rotation: 0.0,
            electrical_type,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolUnit {
    #[serde(default)]
    pub pins: Vec<SymbolPin>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolDefinition {
    pub lib_id: String,
    /// Unit 0 holds pins shared by every unit.
    #[serde(default)]
    pub units: BTreeMap<u32, SymbolUnit>,
}

impl SymbolDefinition {
    pub fn new(lib_id: impl Into<String>) -> Self {
        Self {
            lib_id: lib_id.into(),
            units: BTreeMap::new(),
        }
    }

    pub fn with_unit(mut self, unit: u32, pins: Vec<SymbolPin>) -> Self {
        self.units.insert(unit, SymbolUnit { pins });
        self
    }

    /// Pins placed by one unit of the symbol: the shared unit 0 plus `unit`.
    pub fn pins_for_unit(&self, unit: u32) -> impl Iterator<Item = &SymbolPin> {
        let shared = if unit != 0 { self.units.get(&0) } else { None };
        shared
            .into_iter()
            .chain(self.units.get(&unit))
            .flat_map(|u| u.pins.iter())
    }

    /// Pins of every unit, shared unit 0 first.
    pub fn all_pins(&self) -> impl Iterator<Item = &SymbolPin> {
        self.units.values().flat_map(|u| u.pins.iter())
    }

    pub fn pin(&self, number: &str) -> Option<&SymbolPin> {
        self.units
            .values()
            .flat_map(|u| u.pins.iter())
            .find(|p| p.number == number)
    }
}

/// Lookup capability consumed by net extraction and ERC.
///
/// `Ok(None)` means the symbol is unknown and callers degrade gracefully;
/// `Err` is reserved for a broken library backend.
pub trait SymbolLookup {
    fn get_symbol(&self, lib_id: &str) -> Result<Option<Arc<SymbolDefinition>>, LibraryError>;
}

impl<T: SymbolLookup + ?Sized> SymbolLookup for &T {
    fn get_symbol(&self, lib_id: &str) -> Result<Option<Arc<SymbolDefinition>>, LibraryError> {
        (**self).get_symbol(lib_id)
    }
}

/// In-memory symbol library keyed by lib_id
#[derive(Debug, Clone, Default)]
pub struct SymbolLibrary {
    symbols: HashMap<String, Arc<SymbolDefinition>>,
}

impl SymbolLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: SymbolDefinition) {
        self.symbols.insert(symbol.lib_id.clone(), Arc::new(symbol));
    }

    pub fn with_symbol(mut self, symbol: SymbolDefinition) -> Self {
        self.insert(symbol);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Parse a JSON array of symbol definitions.
    pub fn from_json_str(json: &str) -> Result<Self, LibraryError> {
        let definitions: Vec<SymbolDefinition> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for definition in definitions {
            library.insert(definition);
        }
        Ok(library)
    }

    pub fn load_json(path: &Path) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_json_str(&content)?;
        tracing::info!("Loaded {} symbols from {}", library.len(), path.display());
        Ok(library)
    }
}

impl SymbolLookup for SymbolLibrary {
    fn get_symbol(&self, lib_id: &str) -> Result<Option<Arc<SymbolDefinition>>, LibraryError> {
        Ok(self.symbols.get(lib_id).cloned())
    }
}

fn deserialize_pin_type<'de, D>(deserializer: D) -> Result<ElectricalPinType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(ElectricalPinType::from_alias(&raw))
}
