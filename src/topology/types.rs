use crate::geom::{Point, RingRole};

/// A set of polygon geometries broken down into shared arcs.
///
/// Top-down: a TopoGeometry is one or more TopoPolygons; a TopoPolygon is an
/// exterior TopoRing followed by zero or more holes; a TopoRing is a loop of
/// DirectedArcs. A TopoArc is stored once no matter how many TopoRings walk
/// along it. That's what keeps neighbours' borders identical when we
/// simplify(): there is only one copy of the border to simplify.
#[derive(Clone, Debug)]
pub struct Topology {
    pub geometries: Box<[TopoGeometry]>,
    pub polygons: Box<[TopoPolygon]>,
    pub rings: Box<[TopoRing]>,
    pub arcs: Box<[TopoArc]>,
}

// Array indexes into the Topology's arenas. Smaller than pointers and
// trivially shareable between threads.
pub type TopoGeometryId = u32;
pub type TopoPolygonId = u32;
pub type TopoRingId = u32;
pub type TopoArcId = u32;

/// One input geometry: a Polygon if it has one TopoPolygon, else a
/// MultiPolygon.
#[derive(Clone, Debug)]
pub struct TopoGeometry {
    pub polygon_ids: Box<[TopoPolygonId]>,
}

#[derive(Clone, Debug)]
pub struct TopoPolygon {
    pub geometry_id: TopoGeometryId,
    /// Exterior first, then holes.
    pub ring_ids: Box<[TopoRingId]>,
}

#[derive(Clone, Debug)]
pub struct TopoRing {
    pub geometry_id: TopoGeometryId,
    pub polygon_id: TopoPolygonId,
    pub role: RingRole,
    pub directed_arcs: Box<[DirectedArc]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectedArc {
    pub arc_id: TopoArcId,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A direction-less run of Points between two breakpoints.
///
/// Points are stored in canonical direction; a DirectedArc says which way a
/// given TopoRing walks it. An arc whose first and last Points are equal is
/// a closed loop (a Ring with zero or one breakpoints).
#[derive(Clone, Debug)]
pub struct TopoArc {
    pub points: Box<[Point]>,
    pub ring_ids: Box<[TopoRingId]>,
}

impl DirectedArc {
    /// Returns the arc's Points in the order this ring walks them.
    pub fn points<'a>(&self, arcs: &'a [TopoArc]) -> Box<dyn Iterator<Item=&'a Point> + 'a> {
        let points = &arcs[self.arc_id as usize].points;
        match self.direction {
            Direction::Forward => Box::new(points.iter()),
            Direction::Backward => Box::new(points.iter().rev()),
        }
    }
}
