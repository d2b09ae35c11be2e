//! NetGuard - schematic connectivity extraction and electrical rules checking
//!
//! This library turns a schematic's wires, junctions, labels and placed
//! component pins into named nets, then validates them with a configurable
//! Electrical Rules Check (pin type conflicts, unconnected pins, duplicate
//! references, grid alignment, missing footprints/values, floating labels).
//!
//! # Quick Start
//!
//! ```no_run
//! use netguard::prelude::*;
//! use std::path::Path;
//!
//! let schematic = Schematic::load_json(Path::new("board.json")).unwrap();
//! let library = SymbolLibrary::load_json(Path::new("symbols.json")).unwrap();
//!
//! let result = NetguardCore::check(&schematic, &library, ErcConfig::default());
//! for violation in &result.violations {
//!     println!("{}: {}", violation.code, violation.message);
//! }
//! ```
//!
//! # Features
//!
//! - **Connectivity**: tolerance-aware segment intersection, junction-aware crossings
//! - **Net naming**: local, global and hierarchical labels plus power symbols
//! - **ERC**: pin conflict matrix and schematic hygiene checks

pub mod analyzer;
pub mod connectivity;
pub mod core;
pub mod schematic;

// Re-export main types
pub use crate::core::{NetguardCore, NetguardError};
pub use analyzer::erc::{ErcChecker, ErcConfig, ErcResult};
pub use analyzer::pin_matrix::{ElectricalPinType, PinConflictMatrix, PinConflictSeverity};
pub use analyzer::rules::{ErcCode, ErcViolation, Severity};
pub use connectivity::{NetAnalysis, NetAnalysisError, NetExtractor, NetInfo, PinConnection, PinConnectionStatus};
pub use schematic::{Schematic, SymbolLibrary, SymbolLookup};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ErcChecker, ErcCode, ErcConfig, ErcResult, ErcViolation, NetAnalysis, NetExtractor, NetInfo,
        NetguardCore, NetguardError, PinConnection, Schematic, Severity, SymbolLibrary, SymbolLookup,
    };
}
