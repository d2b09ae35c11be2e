pub mod erc;
pub mod pin_matrix;
pub mod rules;

// Re-export for convenience
pub use erc::*;
pub use pin_matrix::*;
pub use rules::*;
