use std::collections::HashMap;
use std::collections::hash_map::Entry;

use geo::MultiPolygon;
use itertools::Itertools;

use crate::geom::{line_string_to_ring, Point, Ring, RingRole};
use super::types::{
    DirectedArc, Direction, TopoArc, TopoArcId, TopoGeometry, TopoGeometryId, TopoPolygon,
    TopoPolygonId, TopoRing, TopoRingId, Topology,
};

/// The sorted set of coordinates where arcs must start and end.
///
/// A coordinate is a breakpoint when walking the rings reaches it from a
/// different pair of neighbours than the first time around. Inside a border
/// shared by two rings every coordinate is visited twice with the same two
/// neighbours (once per direction); at the ends of the shared stretch the
/// neighbours differ.
#[derive(Debug, Default)]
pub struct Breakpoints(Box<[Point]>);

impl Breakpoints {
    pub fn find(rings: &[Ring]) -> Breakpoints {
        // first (previous, next) pair seen at each coordinate
        let mut neighbours: HashMap<Point, (Point, Point)> = HashMap::new();
        let mut ret: Vec<Point> = vec![];

        for ring in rings {
            for (&previous, &point, &next) in ring.points().iter().circular_tuple_windows() {
                match neighbours.entry(point) {
                    Entry::Vacant(entry) => {
                        entry.insert((previous, next));
                    }
                    Entry::Occupied(entry) => {
                        let &(a, b) = entry.get();
                        let same = (a == previous && b == next) || (a == next && b == previous);
                        if !same {
                            ret.push(point);
                        }
                    }
                }
            }
        }

        ret.sort();
        ret.dedup();
        Breakpoints(ret.into_boxed_slice())
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.0.binary_search(point).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct PendingRing {
    geometry_id: TopoGeometryId,
    polygon_id: TopoPolygonId,
    role: RingRole,
    ring: Ring,
}

/// Collects polygon geometries, then splits their rings into shared arcs.
///
/// Breakpoints depend on every ring at once, so nothing is split until
/// `into_topology()`.
#[derive(Default)]
pub struct TopologyBuilder {
    geometries: Vec<TopoGeometry>,
    polygons: Vec<TopoPolygon>,
    pending: Vec<PendingRing>,
}

impl TopologyBuilder {
    pub fn new() -> TopologyBuilder {
        TopologyBuilder::default()
    }

    pub fn add_geometry(&mut self, geometry: &MultiPolygon<f64>) -> TopoGeometryId {
        let geometry_id = self.geometries.len() as TopoGeometryId;
        let mut polygon_ids = Vec::with_capacity(geometry.0.len());

        for polygon in &geometry.0 {
            // Without an exterior, a hole would take its place.
            let exterior = line_string_to_ring(polygon.exterior());
            if exterior.len() < 2 {
                continue;
            }

            let polygon_id = self.polygons.len() as TopoPolygonId;
            let holes = polygon.interiors().iter()
                .map(line_string_to_ring)
                .filter(|ring| ring.len() >= 2)
                .map(|ring| (RingRole::Inner, ring));

            let mut ring_ids = vec![];
            for (role, ring) in std::iter::once((RingRole::Outer, exterior)).chain(holes) {
                ring_ids.push(self.pending.len() as TopoRingId);
                self.pending.push(PendingRing { geometry_id, polygon_id, role, ring });
            }

            self.polygons.push(TopoPolygon { geometry_id, ring_ids: ring_ids.into_boxed_slice() });
            polygon_ids.push(polygon_id);
        }

        self.geometries.push(TopoGeometry { polygon_ids: polygon_ids.into_boxed_slice() });
        geometry_id
    }

    pub fn into_topology(self) -> Topology {
        let TopologyBuilder { geometries, polygons, pending } = self;

        let all_rings: Vec<Ring> = pending.iter().map(|p| p.ring.clone()).collect();
        let breakpoints = Breakpoints::find(&all_rings);

        let mut arcs = ArcTable::default();
        let rings: Vec<TopoRing> = pending.into_iter()
            .enumerate()
            .map(|(i, p)| {
                let directed_arcs = split_ring(p.ring.points(), &breakpoints).into_iter()
                    .map(|(points, is_island)| arcs.add(points, is_island, i as TopoRingId))
                    .collect::<Vec<DirectedArc>>();
                TopoRing {
                    geometry_id: p.geometry_id,
                    polygon_id: p.polygon_id,
                    role: p.role,
                    directed_arcs: directed_arcs.into_boxed_slice(),
                }
            })
            .collect();

        Topology {
            geometries: geometries.into_boxed_slice(),
            polygons: polygons.into_boxed_slice(),
            rings: rings.into_boxed_slice(),
            arcs: arcs.into_arcs(),
        }
    }
}

/// Splits one ring (no closing duplicate) at its breakpoints.
///
/// Returns each arc's Points in ring order, plus whether it is an "island":
/// a closed loop with no breakpoint at all, whose start is arbitrary.
fn split_ring(coords: &[Point], breakpoints: &Breakpoints) -> Vec<(Vec<Point>, bool)> {
    let splits: Vec<usize> = coords.iter()
        .enumerate()
        .filter(|&(_, p)| breakpoints.contains(p))
        .map(|(i, _)| i)
        .collect();

    let wrap = |start: usize, end: usize| -> Vec<Point> {
        let mut points = Vec::with_capacity(coords.len() - start + end + 1);
        points.extend_from_slice(&coords[start..]);
        points.extend_from_slice(&coords[..=end]);
        points
    };

    match splits.len() {
        0 => {
            let mut points = coords.to_vec();
            points.push(coords[0]);
            vec![ (points, true) ]
        }
        1 => vec![ (wrap(splits[0], splits[0]), false) ],
        n => {
            let mut ret: Vec<(Vec<Point>, bool)> = splits.iter()
                .tuple_windows()
                .map(|(&start, &end)| (coords[start..=end].to_vec(), false))
                .collect();
            ret.push((wrap(splits[n - 1], splits[0]), false));
            ret
        }
    }
}

/// The arc arena, deduplicated by canonical Points.
#[derive(Default)]
struct ArcTable {
    arcs: Vec<TopoArc>,
    ring_ids: Vec<Vec<TopoRingId>>,

    // HashMap's Entry API lets us insert-or-get the key
    arc_ids: HashMap<Vec<Point>, TopoArcId>,
}

impl ArcTable {
    /// Returns a DirectedArc, adding an arc if this run of Points is new.
    fn add(&mut self, mut points: Vec<Point>, is_island: bool, ring_id: TopoRingId) -> DirectedArc {
        let len = points.len();
        let first = points[0];
        let last = points[len - 1];

        if is_island {
            // rotate so the smallest Point starts (and ends) the loop
            points.pop();
            if let Some((index, _)) = points.iter().enumerate().min_by(|a, b| a.1.cmp(b.1)) {
                points.rotate_left(index);
            }
            points.push(points[0]);
        }

        let forward = if first != last {
            first < last
        } else {
            len < 3 || points[1] <= points[len - 2]
        };

        let direction = if forward {
            Direction::Forward
        } else {
            points.reverse();
            Direction::Backward
        };

        let next_id = self.arcs.len() as TopoArcId;

        let arc_id = match self.arc_ids.entry(points) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.arcs.push(TopoArc {
                    points: entry.key().clone().into_boxed_slice(),
                    ring_ids: Box::new([]),
                });
                self.ring_ids.push(vec![]);
                entry.insert(next_id);
                next_id
            }
        };

        let owners = &mut self.ring_ids[arc_id as usize];
        if owners.last() != Some(&ring_id) {
            owners.push(ring_id);
        }

        DirectedArc { arc_id, direction }
    }

    fn into_arcs(self) -> Box<[TopoArc]> {
        let ArcTable { mut arcs, ring_ids, .. } = self;
        for (arc, owners) in arcs.iter_mut().zip(ring_ids) {
            arc.ring_ids = owners.into_boxed_slice();
        }
        arcs.into_boxed_slice()
    }
}

/// Builds one Topology out of an ordered list of geometries.
///
/// Geometry ids are indexes into `geometries`.
pub fn build_topology(geometries: &[MultiPolygon<f64>]) -> Topology {
    let mut builder = TopologyBuilder::new();
    for geometry in geometries {
        builder.add_geometry(geometry);
    }
    builder.into_topology()
}
