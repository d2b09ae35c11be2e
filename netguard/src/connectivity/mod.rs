pub mod geometry;
pub mod netlist;
pub mod pins;
pub mod union_find;

// Re-export for convenience
pub use geometry::{Intersection, PointKey, Segment, TOLERANCE};
pub use netlist::{NetAnalysis, NetAnalysisError, NetExtractor, NetInfo, PinConnectionStatus, UniqueLabels};
pub use pins::{declared_component_pins, resolve_component_pins, transform_pin_position, PinConnection};
pub use union_find::UnionFind;
