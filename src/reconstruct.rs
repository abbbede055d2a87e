//! Turns a (simplified) Topology back into polygons.
use geo::algorithm::orient::{Direction as Winding, Orient};
use geo::{BooleanOps, Coord, InteriorPoint, LineString, MultiPolygon, Polygon, Validation};
use log::debug;

use crate::error::ReconstructionError;
use crate::geom::Point;
use crate::topology::{TopoGeometryId, TopoRingId, Topology};

/// An areal geometry: one polygon, or several.
#[derive(Clone, Debug, PartialEq)]
pub enum Areal {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Areal {
    fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Areal {
        if polygons.len() == 1 {
            Areal::Polygon(polygons.remove(0))
        } else {
            Areal::MultiPolygon(MultiPolygon::new(polygons))
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Areal::Polygon(polygon) => MultiPolygon::new(vec![ polygon.clone() ]),
            Areal::MultiPolygon(multi) => multi.clone(),
        }
    }

    pub fn polygon_count(&self) -> usize {
        match self {
            Areal::Polygon(_) => 1,
            Areal::MultiPolygon(multi) => multi.0.len(),
        }
    }

    /// Number of coordinates, closing duplicates included.
    pub fn coord_count(&self) -> usize {
        self.to_multi_polygon().0.iter()
            .map(|p| p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>())
            .sum()
    }

    /// A Point guaranteed to lie inside the geometry.
    pub fn representative_point(&self) -> Option<Point> {
        let point = match self {
            Areal::Polygon(polygon) => polygon.interior_point(),
            Areal::MultiPolygon(multi) => multi.interior_point(),
        };
        point.map(Point::from)
    }
}

/// Rebuilds every geometry, in input order.
pub fn reconstruct(topology: &Topology) -> Result<Vec<Areal>, ReconstructionError> {
    (0 .. topology.geometries.len())
        .map(|id| reconstruct_geometry(topology, id as TopoGeometryId))
        .collect()
}

/// Rebuilds one geometry from its rings' arcs.
///
/// The first ring of each polygon is its exterior; the rest are holes. A
/// result that isn't valid (simplification can make rings cross) is
/// repaired. Every result is oriented: exteriors counter-clockwise, holes
/// clockwise. Valid geometries keep their coordinates exactly, so shared
/// borders stay identical.
pub fn reconstruct_geometry(topology: &Topology, geometry_id: TopoGeometryId) -> Result<Areal, ReconstructionError> {
    let geometry = &topology.geometries[geometry_id as usize];

    let polygons: Vec<Polygon<f64>> = geometry.polygon_ids.iter()
        .filter_map(|&polygon_id| {
            let ring_ids = &topology.polygons[polygon_id as usize].ring_ids;
            let (&exterior, holes) = ring_ids.split_first()?;
            Some(Polygon::new(
                ring_line_string(topology, exterior),
                holes.iter().map(|&r| ring_line_string(topology, r)).collect(),
            ))
        })
        .collect();

    let mut multi = MultiPolygon::new(polygons);

    if !multi.is_valid() {
        debug!("geometry {} is invalid after simplification; repairing", geometry_id);
        multi = repair(&multi);
        if multi.0.is_empty() || !multi.is_valid() {
            return Err(ReconstructionError::Unrepairable { geometry_id });
        }
    }

    let oriented = multi.orient(Winding::Default);
    Ok(Areal::from_polygons(oriented.0))
}

/// Resolves self-intersections by overlaying the geometry onto nothing,
/// which keeps its area and rebuilds valid rings.
fn repair(multi: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    multi.union(&MultiPolygon::new(vec![]))
}

fn ring_line_string(topology: &Topology, ring_id: TopoRingId) -> LineString<f64> {
    topology.ring_points(ring_id).into_iter().map(Coord::from).collect()
}
