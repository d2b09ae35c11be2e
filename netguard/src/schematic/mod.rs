pub mod schema;
pub mod symbols;

// Re-export for convenience
pub use schema::*;
pub use symbols::{LibraryError, SymbolDefinition, SymbolLibrary, SymbolLookup, SymbolPin, SymbolUnit};
