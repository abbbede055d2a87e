//! A graph of polygons whose shared borders are stored once.
mod build;
mod types;

pub use self::build::{build_topology, Breakpoints, TopologyBuilder};
pub use self::types::{
    DirectedArc, Direction, TopoArc, TopoArcId, TopoGeometry, TopoGeometryId, TopoPolygon,
    TopoPolygonId, TopoRing, TopoRingId, Topology,
};

use crate::geom::Point;

impl Topology {
    /// Returns the closed loop of Points a ring walks (first == last).
    ///
    /// Consecutive arcs share their junction Point; it is only emitted once.
    pub fn ring_points(&self, ring_id: TopoRingId) -> Vec<Point> {
        let ring = &self.rings[ring_id as usize];
        let mut ret: Vec<Point> = Vec::with_capacity(self.ring_len(ring_id) + 1);

        for (i, directed_arc) in ring.directed_arcs.iter().enumerate() {
            let skip = if i == 0 { 0 } else { 1 };
            ret.extend(directed_arc.points(&self.arcs).skip(skip));
        }

        ret
    }

    /// Number of distinct Points in a ring: its closed loop minus the
    /// closing duplicate.
    pub fn ring_len(&self, ring_id: TopoRingId) -> usize {
        self.rings[ring_id as usize].directed_arcs.iter()
            .map(|d| self.arcs[d.arc_id as usize].points.len().saturating_sub(1))
            .sum()
    }

    /// Total number of arc Points: a measure of how detailed the Topology is.
    pub fn point_count(&self) -> usize {
        self.arcs.iter().map(|a| a.points.len()).sum()
    }
}
