//! Point and segment math under a fixed tolerance.
//!
//! Schematic coordinates are floats on a 1.27 grid, so exact comparisons are
//! useless. Every test here uses [`TOLERANCE`], which also matches the
//! two-decimal rounding of [`PointKey`].

use std::fmt;

use crate::schematic::Position;

/// Tolerance for all geometric comparisons (schematic units)
pub const TOLERANCE: f64 = 0.01;

/// Canonical identity of a point: coordinates rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    x: i64,
    y: i64,
}

impl PointKey {
    pub fn of(p: &Position) -> Self {
        Self {
            x: (p.x * 100.0).round() as i64,
            y: (p.y * 100.0).round() as i64,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x as f64 / 100.0, self.y as f64 / 100.0)
    }
}

impl From<&Position> for PointKey {
    fn from(p: &Position) -> Self {
        PointKey::of(p)
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position();
        write!(f, "{:.2},{:.2}", p.x, p.y)
    }
}

/// One wire edge between two consecutive wire points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Position,
    pub end: Position,
}

impl Segment {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, p: &Position) -> bool {
        point_on_segment(p, &self.start, &self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        points_equal(&self.start, &self.end)
    }
}

/// Outcome of intersecting two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    None,
    Point(Position),
    Overlap(Position, Position),
}

pub fn points_equal(a: &Position, b: &Position) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}

/// Collinear with the segment and within its span, endpoints included.
pub fn point_on_segment(p: &Position, start: &Position, end: &Position) -> bool {
    let cross = (end.x - start.x) * (p.y - start.y) - (end.y - start.y) * (p.x - start.x);
    if cross.abs() > TOLERANCE {
        return false;
    }

    let dot = (p.x - start.x) * (p.x - end.x) + (p.y - start.y) * (p.y - end.y);
    dot <= TOLERANCE
}

pub fn segment_intersection(a1: &Position, a2: &Position, b1: &Position, b2: &Position) -> Intersection {
    let dax = a2.x - a1.x;
    let day = a2.y - a1.y;
    let dbx = b2.x - b1.x;
    let dby = b2.y - b1.y;

    let denom = dax * dby - day * dbx;

    if denom.abs() < TOLERANCE {
        // Parallel: only collinear segments can share points.
        let cross_start = dax * (b1.y - a1.y) - day * (b1.x - a1.x);
        if cross_start.abs() > TOLERANCE {
            return Intersection::None;
        }
        return collinear_overlap(a1, a2, b1, b2);
    }

    let ua = (dbx * (a1.y - b1.y) - dby * (a1.x - b1.x)) / denom;
    let ub = (dax * (a1.y - b1.y) - day * (a1.x - b1.x)) / denom;

    let in_range = |t: f64| (-TOLERANCE..=1.0 + TOLERANCE).contains(&t);
    if in_range(ua) && in_range(ub) {
        Intersection::Point(Position::new(a1.x + ua * dax, a1.y + ua * day))
    } else {
        Intersection::None
    }
}

fn collinear_overlap(a1: &Position, a2: &Position, b1: &Position, b2: &Position) -> Intersection {
    let use_x = (a2.x - a1.x).abs() >= (a2.y - a1.y).abs();
    let coord = |p: &Position| if use_x { p.x } else { p.y };

    let (a_min, a_max) = min_max(coord(a1), coord(a2));
    let (b_min, b_max) = min_max(coord(b1), coord(b2));

    let lo = a_min.max(b_min);
    let hi = a_max.min(b_max);
    if lo > hi + TOLERANCE {
        return Intersection::None;
    }

    Intersection::Overlap(point_on_line(a1, a2, lo, use_x), point_on_line(a1, a2, hi, use_x))
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Map a dominant-axis coordinate back onto the line through `a1`-`a2`.
fn point_on_line(a1: &Position, a2: &Position, value: f64, use_x: bool) -> Position {
    let dx = a2.x - a1.x;
    let dy = a2.y - a1.y;
    if use_x {
        if dx.abs() < f64::EPSILON {
            return Position::new(value, a1.y);
        }
        let t = (value - a1.x) / dx;
        Position::new(value, a1.y + t * dy)
    } else {
        if dy.abs() < f64::EPSILON {
            return Position::new(a1.x, value);
        }
        let t = (value - a1.y) / dy;
        Position::new(a1.x + t * dx, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_points_equal_tolerance() {
        assert!(points_equal(&p(1.0, 1.0), &p(1.005, 0.995)));
        assert!(!points_equal(&p(1.0, 1.0), &p(1.02, 1.0)));
    }

    #[test]
    fn test_point_key_rounding() {
        assert_eq!(PointKey::of(&p(1.271, 2.539)), PointKey::of(&p(1.27, 2.54)));
        assert_ne!(PointKey::of(&p(1.27, 2.54)), PointKey::of(&p(1.28, 2.54)));
        assert_eq!(PointKey::of(&p(-5.0, 12.7)).to_string(), "-5.00,12.70");
    }

    #[test]
    fn test_point_on_segment() {
        let start = p(0.0, 0.0);
        let end = p(10.0, 0.0);

        assert!(point_on_segment(&p(5.0, 0.0), &start, &end));
        assert!(point_on_segment(&p(0.0, 0.0), &start, &end));
        assert!(point_on_segment(&p(10.0, 0.0), &start, &end));
        assert!(!point_on_segment(&p(5.0, 0.5), &start, &end));
        assert!(!point_on_segment(&p(11.0, 0.0), &start, &end));
    }

    #[test]
    fn test_crossing_segments_intersect_at_point() {
        let result = segment_intersection(&p(0.0, 0.0), &p(10.0, 10.0), &p(0.0, 10.0), &p(10.0, 0.0));
        match result {
            Intersection::Point(x) => assert!(points_equal(&x, &p(5.0, 5.0))),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_segments() {
        let result = segment_intersection(&p(0.0, 0.0), &p(1.0, 1.0), &p(5.0, 0.0), &p(6.0, -1.0));
        assert_eq!(result, Intersection::None);
    }

    #[test]
    fn test_parallel_non_collinear() {
        let result = segment_intersection(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 5.0), &p(10.0, 5.0));
        assert_eq!(result, Intersection::None);
    }

    #[test]
    fn test_collinear_overlap() {
        let result = segment_intersection(&p(0.0, 0.0), &p(10.0, 0.0), &p(5.0, 0.0), &p(15.0, 0.0));
        match result {
            Intersection::Overlap(s, e) => {
                assert!(points_equal(&s, &p(5.0, 0.0)));
                assert!(points_equal(&e, &p(10.0, 0.0)));
            }
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_vertical_collinear_overlap() {
        let result = segment_intersection(&p(2.0, 0.0), &p(2.0, 10.0), &p(2.0, 12.0), &p(2.0, 4.0));
        match result {
            Intersection::Overlap(s, e) => {
                assert!(points_equal(&s, &p(2.0, 4.0)));
                assert!(points_equal(&e, &p(2.0, 10.0)));
            }
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_collinear_gap() {
        let result = segment_intersection(&p(0.0, 0.0), &p(4.0, 0.0), &p(6.0, 0.0), &p(10.0, 0.0));
        assert_eq!(result, Intersection::None);
    }

    #[test]
    fn test_t_junction_touch() {
        let result = segment_intersection(&p(0.0, 0.0), &p(10.0, 0.0), &p(5.0, 0.0), &p(5.0, 10.0));
        match result {
            Intersection::Point(x) => assert!(points_equal(&x, &p(5.0, 0.0))),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_segment() {
        let seg = Segment::new(p(3.0, 3.0), p(3.0, 3.0));
        assert!(seg.is_degenerate());
        assert!(seg.contains(&p(3.0, 3.0)));
        assert!(!seg.contains(&p(4.0, 3.0)));
    }
}
