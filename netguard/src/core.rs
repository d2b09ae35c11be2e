//! Entry points shared by hosts embedding the checker.
//! No file-format or UI dependencies.

use std::path::Path;

use crate::analyzer::erc::{ErcChecker, ErcConfig, ErcResult};
use crate::connectivity::{NetAnalysis, NetAnalysisError, NetExtractor};
use crate::schematic::{LibraryError, Schematic, SymbolLibrary, SymbolLookup};

#[derive(Debug, thiserror::Error)]
pub enum NetguardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Symbol library error: {0}")]
    Library(#[from] LibraryError),
    #[error("Net analysis failed: {0}")]
    Analysis(#[from] NetAnalysisError),
}

/// Core API over schematic snapshots.
pub struct NetguardCore;

impl NetguardCore {
    /// Run ERC over an in-memory schematic.
    pub fn check(schematic: &Schematic, symbols: &dyn SymbolLookup, config: ErcConfig) -> ErcResult {
        ErcChecker::new(schematic, symbols, config).check()
    }

    /// Extract nets from an in-memory schematic.
    pub fn analyze(schematic: &Schematic, symbols: &dyn SymbolLookup) -> Result<NetAnalysis, NetguardError> {
        Ok(NetExtractor::new(schematic, symbols).analyze_nets()?)
    }

    /// Load a JSON schematic snapshot (and optionally a JSON symbol library)
    /// and run ERC over it.
    pub fn check_files(
        schematic_path: &Path,
        library_path: Option<&Path>,
        config: ErcConfig,
    ) -> Result<ErcResult, NetguardError> {
        let schematic = Schematic::load_json(schematic_path)?;
        let library = match library_path {
            Some(path) => SymbolLibrary::load_json(path)?,
            None => SymbolLibrary::new(),
        };
        Ok(Self::check(&schematic, &library, config))
    }
}
