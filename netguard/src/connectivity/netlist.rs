//! Geometric Net Extractor
//!
//! Builds named nets from wires, junctions, labels, power symbols and
//! resolved component pins. Points are merged through a union-find keyed by
//! [`PointKey`]; wires that merely cross stay apart unless a junction marks
//! the crossing.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::geometry::{points_equal, segment_intersection, Intersection, PointKey, Segment};
use super::pins::{declared_component_pins, resolve_component_pins, PinConnection};
use super::union_find::UnionFind;
use crate::analyzer::pin_matrix::ElectricalPinType;
use crate::schematic::{Component, LabelType, LibraryError, Position, Schematic, SymbolLookup};

#[derive(Debug, thiserror::Error)]
pub enum NetAnalysisError {
    #[error("Failed to resolve pins for {reference}: {source}")]
    SymbolLookup {
        reference: String,
        source: LibraryError,
    },
}

/// Ordered, duplicate-free label texts. Iteration yields first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct UniqueLabels {
    items: Vec<String>,
}

impl UniqueLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` unless already present. Returns whether it was added.
    pub fn push(&mut self, text: &str) -> bool {
        if self.contains(text) {
            return false;
        }
        self.items.push(text.to_string());
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|t| t == text)
    }

    pub fn first(&self) -> Option<&str> {
        self.items.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl From<Vec<String>> for UniqueLabels {
    fn from(texts: Vec<String>) -> Self {
        let mut labels = Self::new();
        for text in &texts {
            labels.push(text);
        }
        labels
    }
}

impl From<UniqueLabels> for Vec<String> {
    fn from(labels: UniqueLabels) -> Self {
        labels.items
    }
}

/// One electrical net
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetInfo {
    pub name: String,
    pub pins: Vec<PinConnection>,
    pub labels: UniqueLabels,
    pub junctions: Vec<Position>,
    pub wire_count: usize,
}

impl NetInfo {
    /// Get all component references connected to this net
    pub fn connected_components(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        for pin in &self.pins {
            if !refs.contains(&pin.reference.as_str()) {
                refs.push(pin.reference.as_str());
            }
        }
        refs
    }

    /// Check if a specific component is connected to this net
    pub fn has_component(&self, reference: &str) -> bool {
        self.pins.iter().any(|p| p.reference == reference)
    }

    pub fn has_pin(&self, reference: &str, pin: &str) -> bool {
        self.pins.iter().any(|p| p.reference == reference && p.pin == pin)
    }
}

/// Output of one analysis run: the nets plus a point index over them.
#[derive(Debug, Clone, Default)]
pub struct NetAnalysis {
    pub nets: Vec<NetInfo>,
    point_index: HashMap<PointKey, usize>,
}

impl NetAnalysis {
    /// Net owning `point`, if the point belongs to a materialized net.
    pub fn net_at_point(&self, point: &Position) -> Option<&NetInfo> {
        self.point_index
            .get(&PointKey::of(point))
            .and_then(|&idx| self.nets.get(idx))
    }

    pub fn net_by_name(&self, name: &str) -> Option<&NetInfo> {
        self.nets.iter().find(|n| n.name == name)
    }

    pub fn net_for_pin(&self, reference: &str, pin: &str) -> Option<&NetInfo> {
        self.nets.iter().find(|n| n.has_pin(reference, pin))
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }
}

/// Result of probing a single component pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConnectionStatus {
    pub connected: bool,
    pub net_name: Option<String>,
}

impl PinConnectionStatus {
    fn disconnected() -> Self {
        Self {
            connected: false,
            net_name: None,
        }
    }
}

/// Text anchored at a point: a label or a power symbol's implied net name.
#[derive(Debug, Clone)]
struct LabelAnchor<'s> {
    text: &'s str,
    position: Position,
}

/// Geometric net extractor over one schematic snapshot
pub struct NetExtractor<'a> {
    schematic: &'a Schematic,
    symbols: &'a dyn SymbolLookup,
}

impl<'a> NetExtractor<'a> {
    pub fn new(schematic: &'a Schematic, symbols: &'a dyn SymbolLookup) -> Self {
        Self { schematic, symbols }
    }

    /// Build every net of the schematic from scratch.
    pub fn analyze_nets(&self) -> Result<NetAnalysis, NetAnalysisError> {
        let mut uf: UnionFind<PointKey> = UnionFind::new();

        // Step 1: Wire segments
        let segments = self.build_segments(&mut uf);

        // Step 2: Junctions are registered but not yet tied to anything
        let junction_keys: HashSet<PointKey> = self
            .schematic
            .junctions
            .iter()
            .map(|j| PointKey::of(&j.position))
            .collect();
        for key in &junction_keys {
            uf.insert(*key);
        }

        // Step 3: Segment against segment
        Self::connect_segment_pairs(&segments, &junction_keys, &mut uf);

        // Step 4: Labels, including power symbol net names
        let anchors = self.label_anchors();
        for anchor in &anchors {
            Self::attach_point(&anchor.position, &segments, &mut uf);
        }

        // Step 5: Component pins
        let pins = self.resolve_all_pins()?;
        for pin in &pins {
            Self::attach_point(&pin.position, &segments, &mut uf);
        }

        // Step 6: Junctions sitting on a wire
        for junction in &self.schematic.junctions {
            Self::attach_point(&junction.position, &segments, &mut uf);
        }

        // Step 7: Group into nets
        let analysis = self.collect_nets(&mut uf, &anchors, pins);

        tracing::debug!(
            "Net analysis: {} segments, {} points, {} nets",
            segments.len(),
            uf.len(),
            analysis.nets.len()
        );

        Ok(analysis)
    }

    /// Convenience form of [`NetAnalysis::net_at_point`] on a fresh analysis.
    pub fn net_at_point(&self, point: &Position) -> Result<Option<NetInfo>, NetAnalysisError> {
        Ok(self.analyze_nets()?.net_at_point(point).cloned())
    }

    /// Pins whose resolved position shares `point`'s key. No net analysis.
    pub fn pins_at_position(&self, point: &Position) -> Result<Vec<PinConnection>, NetAnalysisError> {
        let key = PointKey::of(point);
        Ok(self
            .resolve_all_pins()?
            .into_iter()
            .filter(|p| PointKey::of(&p.position) == key)
            .collect())
    }

    /// A pin is connected when it sits on a wire vertex; the owning net is
    /// then looked up on a full re-analysis. Stacked pins sharing a number
    /// count as connected when any of them is on a vertex.
    pub fn check_pin_connection(
        &self,
        reference: &str,
        pin_number: &str,
    ) -> Result<PinConnectionStatus, NetAnalysisError> {
        let Some(component) = self.schematic.component(reference) else {
            return Ok(PinConnectionStatus::disconnected());
        };

        let pins = resolve_component_pins(component, self.symbols).map_err(|source| {
            NetAnalysisError::SymbolLookup {
                reference: reference.to_string(),
                source,
            }
        })?;

        let on_vertex = pins
            .iter()
            .filter(|p| p.pin == pin_number)
            .any(|p| self.on_wire_vertex(&p.position));
        if !on_vertex {
            return Ok(PinConnectionStatus::disconnected());
        }

        let analysis = self.analyze_nets()?;
        Ok(PinConnectionStatus {
            connected: true,
            net_name: analysis
                .net_for_pin(reference, pin_number)
                .map(|n| n.name.clone()),
        })
    }

    /// Pins for which [`Self::check_pin_connection`] would report
    /// `connected: false`, excluding no-connect pins. Stacked pins are
    /// reported once per number.
    ///
    /// Uses the same vertex test without re-running the analysis per pin.
    pub fn find_unconnected_pins(&self) -> Result<Vec<PinConnection>, NetAnalysisError> {
        let pins = self.resolve_all_pins()?;

        let connected: HashSet<String> = pins
            .iter()
            .filter(|p| self.on_wire_vertex(&p.position))
            .map(PinConnection::key)
            .collect();

        let mut reported = HashSet::new();
        Ok(pins
            .into_iter()
            .filter(|p| p.electrical_type != ElectricalPinType::NoConnect)
            .filter(|p| {
                let key = p.key();
                !connected.contains(&key) && reported.insert(key)
            })
            .collect())
    }

    /// Resolve the placed-unit pins of every component, power symbols included.
    pub fn resolve_all_pins(&self) -> Result<Vec<PinConnection>, NetAnalysisError> {
        self.collect_pins(resolve_component_pins)
    }

    /// Every pin each component's symbol declares, across all units.
    pub fn declared_pins(&self) -> Result<Vec<PinConnection>, NetAnalysisError> {
        self.collect_pins(declared_component_pins)
    }

    fn collect_pins(
        &self,
        resolve: fn(&Component, &dyn SymbolLookup) -> Result<Vec<PinConnection>, LibraryError>,
    ) -> Result<Vec<PinConnection>, NetAnalysisError> {
        let mut pins = Vec::new();
        for component in &self.schematic.components {
            let resolved = resolve(component, self.symbols).map_err(|source| NetAnalysisError::SymbolLookup {
                reference: component.reference.clone(),
                source,
            })?;
            pins.extend(resolved);
        }
        Ok(pins)
    }

    fn build_segments(&self, uf: &mut UnionFind<PointKey>) -> Vec<Segment> {
        let mut segments = Vec::new();

        for wire in &self.schematic.wires {
            if let Some(first) = wire.points.first() {
                uf.insert(PointKey::of(first));
            }
            for pair in wire.points.windows(2) {
                uf.union(PointKey::of(&pair[0]), PointKey::of(&pair[1]));
                segments.push(Segment::new(pair[0], pair[1]));
            }
        }

        segments
    }

    fn connect_segment_pairs(
        segments: &[Segment],
        junction_keys: &HashSet<PointKey>,
        uf: &mut UnionFind<PointKey>,
    ) {
        for (i, a) in segments.iter().enumerate() {
            if a.is_degenerate() {
                continue;
            }
            for b in &segments[i + 1..] {
                if b.is_degenerate() {
                    continue;
                }

                match segment_intersection(&a.start, &a.end, &b.start, &b.end) {
                    Intersection::Overlap(start, end) => {
                        let a_key = PointKey::of(&a.start);
                        let b_key = PointKey::of(&b.start);
                        uf.union(a_key, PointKey::of(&a.end));
                        uf.union(a_key, b_key);
                        uf.union(b_key, PointKey::of(&b.end));
                        for boundary in [start, end] {
                            let key = PointKey::of(&boundary);
                            uf.union(key, a_key);
                            uf.union(key, b_key);
                        }
                    }
                    Intersection::Point(p) => {
                        let at_endpoint = [a.start, a.end, b.start, b.end]
                            .iter()
                            .any(|q| points_equal(q, &p));
                        let key = PointKey::of(&p);
                        // Plain crossings need an explicit junction.
                        if at_endpoint || junction_keys.contains(&key) {
                            uf.union(key, PointKey::of(&a.start));
                            uf.union(key, PointKey::of(&b.start));
                        }
                    }
                    Intersection::None => {}
                }
            }
        }
    }

    /// Register `point` and tie it to every segment it lies on.
    fn attach_point(point: &Position, segments: &[Segment], uf: &mut UnionFind<PointKey>) {
        let key = PointKey::of(point);
        uf.insert(key);
        for segment in segments.iter().filter(|s| s.contains(point)) {
            uf.union(key, PointKey::of(&segment.start));
        }
    }

    /// Label anchors in naming priority order: local, global, hierarchical,
    /// then power symbols.
    fn label_anchors(&self) -> Vec<LabelAnchor<'a>> {
        let schematic = self.schematic;
        let mut anchors = Vec::new();

        for label_type in [LabelType::Local, LabelType::Global, LabelType::Hierarchical] {
            anchors.extend(schematic.labels_of_type(label_type).map(|l| LabelAnchor {
                text: l.text.as_str(),
                position: l.position,
            }));
        }

        anchors.extend(
            schematic
                .power_symbols()
                .filter(|c| !c.value.is_empty())
                .map(|c| LabelAnchor {
                    text: c.value.as_str(),
                    position: c.position,
                }),
        );

        anchors
    }

    fn collect_nets(
        &self,
        uf: &mut UnionFind<PointKey>,
        anchors: &[LabelAnchor<'_>],
        pins: Vec<PinConnection>,
    ) -> NetAnalysis {
        let mut pins_by_root: HashMap<PointKey, Vec<PinConnection>> = HashMap::new();
        for pin in pins {
            let root = uf.find(PointKey::of(&pin.position));
            pins_by_root.entry(root).or_default().push(pin);
        }

        let mut labels_by_root: HashMap<PointKey, UniqueLabels> = HashMap::new();
        for anchor in anchors {
            let root = uf.find(PointKey::of(&anchor.position));
            labels_by_root.entry(root).or_default().push(anchor.text);
        }

        let mut wires_by_root: HashMap<PointKey, usize> = HashMap::new();
        for wire in &self.schematic.wires {
            if let Some(first) = wire.points.first() {
                *wires_by_root.entry(uf.find(PointKey::of(first))).or_default() += 1;
            }
        }

        let mut junctions_by_root: HashMap<PointKey, Vec<Position>> = HashMap::new();
        for junction in &self.schematic.junctions {
            let root = uf.find(PointKey::of(&junction.position));
            junctions_by_root.entry(root).or_default().push(junction.position);
        }

        let mut analysis = NetAnalysis::default();
        let mut unnamed = 0usize;

        for (root, members) in uf.groups() {
            let pins = pins_by_root.remove(&root).unwrap_or_default();
            let labels = labels_by_root.remove(&root).unwrap_or_default();
            if pins.is_empty() && labels.is_empty() {
                continue;
            }

            let name = match labels.first() {
                Some(text) => text.to_string(),
                None => {
                    unnamed += 1;
                    format!("Net{}", unnamed)
                }
            };

            let idx = analysis.nets.len();
            for key in members {
                analysis.point_index.insert(key, idx);
            }
            analysis.nets.push(NetInfo {
                name,
                pins,
                labels,
                junctions: junctions_by_root.remove(&root).unwrap_or_default(),
                wire_count: wires_by_root.get(&root).copied().unwrap_or(0),
            });
        }

        analysis
    }

    fn on_wire_vertex(&self, point: &Position) -> bool {
        self.schematic
            .wires
            .iter()
            .any(|w| w.points.iter().any(|p| points_equal(p, point)))
    }
}
