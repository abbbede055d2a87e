use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use geo::{Coord, LineString, Polygon};

/// A place in space: (longitude, latitude).
///
/// Two Points are the same node iff their coordinates are exactly equal.
/// There is no snapping: neighbouring boundaries only share a node when the
/// upstream data gave both of them the very same floats. The one concession
/// is that `-0.0` and `0.0` are the same node, because they compare equal.
///
/// Point is comparable so Rings and arcs can have a canonical start and
/// direction. Ordering is by x, then y.
#[derive(Clone, Copy, Debug)]
pub struct Point(pub f64, pub f64);

fn canonical(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

impl Point {
    /// The exact bit pattern this Point is identified by.
    pub fn key(&self) -> (u64, u64) {
        (canonical(self.0).to_bits(), canonical(self.1).to_bits())
    }

    pub fn x(&self) -> f64 { self.0 }

    pub fn y(&self) -> f64 { self.1 }
}

impl PartialEq for Point {
    fn eq(&self, other: &Point) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Point) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Point) -> Ordering {
        canonical(self.0).total_cmp(&canonical(other.0))
            .then_with(|| canonical(self.1).total_cmp(&canonical(other.1)))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

impl From<Coord<f64>> for Point {
    fn from(c: Coord<f64>) -> Point {
        Point(c.x, c.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Coord<f64> {
        Coord { x: p.0, y: p.1 }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(p: Point) -> geo::Point<f64> {
        geo::Point::new(p.0, p.1)
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(p: geo::Point<f64>) -> Point {
        Point(p.x(), p.y())
    }
}

/// One surveyed way: an ordered, non-empty run of Points.
///
/// Its first and last Points are its terminal nodes.
pub type Segment = Vec<Point>;

/// A closed, simple loop of three or more distinct Points.
///
/// The closing Point is implied: `points()` never repeats the first Point at
/// the end. Rings built by `Ring::canonical()` start at their smallest Point
/// and have their second Point no larger than their last, so two Rings
/// describing the same loop compare equal no matter where the loop was
/// entered or which way it was walked.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ring(Box<[Point]>);

impl Ring {
    /// Wraps Points as-is. The caller promises they're already a loop
    /// without its closing duplicate.
    pub fn new(points: Vec<Point>) -> Ring {
        Ring(points.into_boxed_slice())
    }

    /// Returns the canonical form of an open loop (no closing duplicate).
    pub fn canonical(mut points: Vec<Point>) -> Ring {
        if let Some((min_index, _)) = points.iter().enumerate().min_by(|a, b| a.1.cmp(b.1)) {
            points.rotate_left(min_index);
        }

        let len = points.len();
        if len > 2 && points[1] > points[len - 1] {
            points[1..].reverse();
        }

        Ring(points.into_boxed_slice())
    }

    /// Builds a Ring from a closed loop (first Point == last Point), dropping
    /// the closing duplicate and any repeated consecutive Points.
    pub fn from_closed(points: &[Point]) -> Ring {
        let mut ret: Vec<Point> = Vec::with_capacity(points.len());
        for &point in points {
            if ret.last() != Some(&point) {
                ret.push(point);
            }
        }
        if ret.len() > 1 && ret.first() == ret.last() {
            ret.pop();
        }
        Ring(ret.into_boxed_slice())
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns all Points in the Ring plus the closing duplicate.
    pub fn closed_points(&self) -> Vec<Point> {
        let mut ret = Vec::with_capacity(self.0.len() + 1);
        ret.extend_from_slice(&self.0);
        if let Some(&first) = self.0.first() {
            ret.push(first);
        }
        ret
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        self.closed_points().into_iter().map(Coord::from).collect()
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_line_string(), vec![])
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", point)?;
        }
        write!(f, "]")
    }
}

/// Whether a Ring bounds land or a hole in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingRole {
    Outer,
    Inner,
}

impl RingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RingRole::Outer => "outer",
            RingRole::Inner => "inner",
        }
    }
}

/// Converts a geo LineString into a Ring.
pub fn line_string_to_ring(line_string: &LineString<f64>) -> Ring {
    let points: Vec<Point> = line_string.coords().map(|&c| Point::from(c)).collect();
    Ring::from_closed(&points)
}
