//! Returns a Topology that may be simpler than the given one.
use log::debug;
use rayon::prelude::*;

use crate::topology::{TopoArc, TopoRing, Topology};
mod simplify_arc;

pub use self::simplify_arc::{deviation, simplify_arc, SimplifiedArc};

/// Simplifies every arc of `topology` at `tolerance`.
///
/// Each arc is simplified once and every ring that walks it sees the same
/// result, so neighbours keep identical borders. A ring that would shrink
/// below three Points lowers the tolerance of its own arcs until it
/// doesn't, or until nothing it dropped deviates at all. Lowering only ever
/// adds Points, so the rings that share those arcs stay valid.
///
/// The source Topology is untouched; simplifying at several tolerances
/// always starts over from the full detail.
pub fn simplify(topology: &Topology, tolerance: f64) -> Topology {
    let mut arcs: Vec<SimplifiedArc> = topology.arcs.par_iter()
        .map(|arc| simplify_arc(&arc.points, tolerance))
        .collect();

    for (ring_id, ring) in topology.rings.iter().enumerate() {
        loop {
            let kept = retained_points(ring, &arcs);
            let max_rejected = ring.directed_arcs.iter()
                .map(|d| arcs[d.arc_id as usize].max_rejected)
                .fold(0.0, f64::max);

            if kept >= 3 || max_rejected == 0.0 {
                break;
            }

            let working = ring.directed_arcs.iter()
                .map(|d| arcs[d.arc_id as usize].tolerance)
                .fold(f64::INFINITY, f64::min);
            let lowered = just_below(working.min(max_rejected));

            debug!(
                "ring {} kept {} points at tolerance {}; retrying at {}",
                ring_id, kept, working, lowered
            );

            for directed_arc in ring.directed_arcs.iter() {
                let id = directed_arc.arc_id as usize;
                if arcs[id].tolerance > lowered {
                    arcs[id] = simplify_arc(&topology.arcs[id].points, lowered);
                }
            }
        }
    }

    let arcs: Vec<TopoArc> = arcs.into_iter()
        .zip(topology.arcs.iter())
        .map(|(simplified, source)| TopoArc {
            points: simplified.points,
            ring_ids: source.ring_ids.clone(),
        })
        .collect();

    Topology {
        geometries: topology.geometries.clone(),
        polygons: topology.polygons.clone(),
        rings: topology.rings.clone(),
        arcs: arcs.into_boxed_slice(),
    }
}

/// Simplifies the same Topology at every tolerance, concurrently.
///
/// Results are in the order of `tolerances`.
pub fn simplify_levels(topology: &Topology, tolerances: &[f64]) -> Vec<Topology> {
    tolerances.par_iter()
        .map(|&tolerance| simplify(topology, tolerance))
        .collect()
}

fn retained_points(ring: &TopoRing, arcs: &[SimplifiedArc]) -> usize {
    ring.directed_arcs.iter()
        .map(|d| arcs[d.arc_id as usize].points.len().saturating_sub(1))
        .sum()
}

/// The largest f64 strictly below `v`, so a Point that deviates by exactly
/// `v` is kept at the returned tolerance.
fn just_below(v: f64) -> f64 {
    if v > 0.0 && v.is_finite() {
        f64::from_bits(v.to_bits() - 1)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    use crate::geom::Point;
    use crate::topology::build_topology;

    fn poly(coords: &[(f64, f64)]) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![ Polygon::new(LineString::from(coords.to_vec()), vec![]) ])
    }

    /// Two countries split by a wiggly border from (2,0) up to (2,4).
    fn neighbours() -> Vec<MultiPolygon<f64>> {
        vec![
            poly(&[ (0.0, 0.0), (2.0, 0.0), (2.1, 1.0), (1.9, 2.0), (2.1, 3.0), (2.0, 4.0), (0.0, 4.0), (0.0, 0.0) ]),
            poly(&[ (2.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 4.0), (2.1, 3.0), (1.9, 2.0), (2.1, 1.0), (2.0, 0.0) ]),
        ]
    }

    #[test]
    fn tiny_tolerance_changes_nothing() {
        let topology = build_topology(&neighbours());
        let simplified = simplify(&topology, 0.001);

        assert_eq!(topology.arcs.len(), simplified.arcs.len());
        for (a, b) in topology.arcs.iter().zip(simplified.arcs.iter()) {
            assert_eq!(a.points, b.points);
        }
    }

    #[test]
    fn shared_border_simplifies_once() {
        let topology = build_topology(&neighbours());
        let simplified = simplify(&topology, 0.5);

        let shared: Vec<&TopoArc> = simplified.arcs.iter().filter(|a| a.ring_ids.len() == 2).collect();
        assert_eq!(1, shared.len());
        assert_eq!(&[ Point(2.0, 0.0), Point(2.0, 4.0) ], &shared[0].points[..]);

        // Both rings walk the straightened border.
        for ring_id in 0 .. 2 {
            let points = simplified.ring_points(ring_id);
            assert!(points.contains(&Point(2.0, 0.0)));
            assert!(points.contains(&Point(2.0, 4.0)));
            assert!(!points.contains(&Point(1.9, 2.0)));
        }
    }

    #[test]
    fn source_topology_is_untouched() {
        let topology = build_topology(&neighbours());
        let before = topology.point_count();
        let _ = simplify(&topology, 10.0);
        assert_eq!(before, topology.point_count());
    }

    #[test]
    fn island_keeps_at_least_three_points() {
        let topology = build_topology(&[ poly(&[ (0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0) ]) ]);
        let simplified = simplify(&topology, 10.0);

        assert!(simplified.ring_len(0) >= 3);
    }

    #[test]
    fn every_ring_keeps_at_least_three_points() {
        let topology = build_topology(&neighbours());
        let simplified = simplify(&topology, 1000.0);

        for ring_id in 0 .. simplified.rings.len() {
            assert!(simplified.ring_len(ring_id as u32) >= 3, "ring {} collapsed", ring_id);
        }
    }

    #[test]
    fn ring_with_nothing_to_restore_stays_short() {
        // A there-and-back ring: every Point is already kept, so the retry
        // has nothing to add and gives up below three.
        let topology = build_topology(&[ poly(&[ (0.0, 0.0), (1.0, 0.0), (0.0, 0.0) ]) ]);
        assert_eq!(2, topology.ring_len(0));

        let simplified = simplify(&topology, 10.0);
        assert_eq!(2, simplified.ring_len(0));
        assert_eq!(&[ Point(0.0, 0.0), Point(1.0, 0.0), Point(0.0, 0.0) ], &simplified.arcs[0].points[..]);
    }

    #[test]
    fn levels_are_independent() {
        let topology = build_topology(&neighbours());
        let levels = simplify_levels(&topology, &[ 0.001, 0.5 ]);

        assert_eq!(2, levels.len());
        assert_eq!(topology.point_count(), levels[0].point_count());
        assert!(levels[1].point_count() < levels[0].point_count());
    }

    #[test]
    fn just_below_is_smaller() {
        assert!(just_below(1.0) < 1.0);
        assert!(just_below(1e-300) > 0.0);
        assert_eq!(0.0, just_below(0.0));
    }
}
