//! Builds closed Rings out of an unordered bag of boundary ways.
//!
//! Ways only meet at their ends (or where one way touches another), so no
//! single way is a Ring. We build an IntersectionGraph, enumerate its
//! elementary cycles and turn every cycle that closes geometrically into a
//! canonical Ring.
use std::collections::BTreeSet;

use log::{debug, warn};

use crate::error::AssemblyError;
use crate::geom::{Point, Ring, Segment};

mod cycles;
mod graph;

pub use self::graph::{occurrence_counts, IntersectionGraph};

/// Returns the set of distinct Rings formed by `segments`, sorted.
///
/// All segments must share one (role, country) scope. Fails if any segment
/// dangles (one of its ends touches nothing), if a cycle is a single chain,
/// or if a component of the graph holds more than `max_cycles` cycles.
pub fn assemble_rings(segments: &[Segment], max_cycles: usize) -> Result<Vec<Ring>, AssemblyError> {
    let counts = occurrence_counts(segments);

    for segment in segments {
        if let (Some(&start), Some(&end)) = (segment.first(), segment.last()) {
            let is_intersection = |p: &Point| counts.get(p).map_or(false, |&c| c >= 2);
            if !is_intersection(&start) || !is_intersection(&end) {
                return Err(AssemblyError::OpenSegment { start, end });
            }
        }
    }

    let graph = IntersectionGraph::build(segments, &counts);
    let cycles = cycles::elementary_cycles(&graph, max_cycles)?;
    debug!(
        "intersection graph: {} nodes, {} edges, {} cycles",
        graph.node_count(), graph.edge_count(), cycles.len()
    );

    let mut rings = BTreeSet::new();

    for cycle in cycles {
        let chains: Vec<&[Point]> = cycle.iter().map(|&e| &graph.edge(e).chain[..]).collect();

        if chains.len() < 2 {
            let nodes = cycle.iter().map(|&e| graph.node(graph.edge(e).from)).collect();
            return Err(AssemblyError::DegenerateCycle { nodes });
        }

        let merged = match merge_chains(&chains) {
            Some(merged) => merged,
            None => {
                let nodes: Vec<String> = cycle.iter().map(|&e| graph.node(graph.edge(e).from).to_string()).collect();
                warn!("invalid cycle through {}", nodes.join(","));
                continue;
            }
        };

        // Back-and-forth walks fold onto themselves: too short, or a spur.
        let len = merged.len();
        if len < 4 || merged[1] == merged[len - 2] {
            continue;
        }

        let mut open = merged;
        open.pop();
        rings.insert(Ring::canonical(open));
    }

    debug!("assembled {} rings", rings.len());
    Ok(rings.into_iter().collect())
}

/// Joins consecutive chains end-to-end, flipping each as needed.
///
/// Returns None when two consecutive chains share no endpoint or when the
/// result doesn't end where it started.
fn merge_chains(chains: &[&[Point]]) -> Option<Vec<Point>> {
    let first = chains[0];
    let second = chains[1];

    let first_is_backwards = first[0] == second[0] || first[0] == second[second.len() - 1];
    let mut merged: Vec<Point> = if first_is_backwards {
        first.iter().rev().cloned().collect()
    } else {
        first.to_vec()
    };

    for chain in &chains[1..] {
        let tail = merged[merged.len() - 1];
        if tail == chain[0] {
            merged.extend_from_slice(&chain[1..]);
        } else if tail == chain[chain.len() - 1] {
            merged.extend(chain.iter().rev().skip(1));
        } else {
            return None;
        }
    }

    if merged.first() == merged.last() {
        Some(merged)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point { Point(x, y) }

    fn unit_square() -> Vec<Segment> {
        vec![
            vec![ p(0.0, 0.0), p(1.0, 0.0) ],
            vec![ p(1.0, 0.0), p(1.0, 1.0) ],
            vec![ p(1.0, 1.0), p(0.0, 1.0) ],
            vec![ p(0.0, 1.0), p(0.0, 0.0) ],
        ]
    }

    fn assert_closed_and_simple(ring: &Ring) {
        let points = ring.points();
        assert!(points.len() >= 3);
        let distinct: BTreeSet<Point> = points.iter().cloned().collect();
        assert_eq!(points.len(), distinct.len(), "ring repeats a node: {}", ring);
    }

    #[test]
    fn unit_square_makes_one_ring() {
        let rings = assemble_rings(&unit_square(), 1000).unwrap();

        assert_eq!(1, rings.len());
        assert_eq!(&[ p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0) ], rings[0].points());
        assert_closed_and_simple(&rings[0]);
    }

    #[test]
    fn order_and_direction_do_not_matter() {
        let expected = assemble_rings(&unit_square(), 1000).unwrap();

        let mut shuffled = unit_square();
        shuffled.reverse();
        for segment in shuffled.iter_mut().step_by(2) {
            segment.reverse();
        }

        assert_eq!(expected, assemble_rings(&shuffled, 1000).unwrap());
    }

    #[test]
    fn ring_from_two_ways_with_interior_points() {
        let rings = assemble_rings(&[
            vec![ p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0) ],
            vec![ p(0.0, 2.0), p(-1.0, 1.0), p(0.0, 0.0) ],
        ], 1000).unwrap();

        assert_eq!(1, rings.len());
        assert_eq!(5, rings[0].len());
        assert_closed_and_simple(&rings[0]);
    }

    #[test]
    fn closed_way_is_an_island() {
        let rings = assemble_rings(&[
            vec![ p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0) ],
        ], 1000).unwrap();

        assert_eq!(1, rings.len());
        assert_eq!(4, rings[0].len());
    }

    #[test]
    fn two_adjacent_squares_make_three_rings() {
        // Left square, right square and their outline.
        let rings = assemble_rings(&[
            vec![ p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0) ],
            vec![ p(2.0, 0.0), p(2.0, 1.0), p(1.0, 1.0) ],
            vec![ p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0) ],
            vec![ p(1.0, 0.0), p(1.0, 1.0) ],
        ], 1000).unwrap();

        assert_eq!(3, rings.len());
        for ring in &rings {
            assert_closed_and_simple(ring);
        }
    }

    #[test]
    fn no_segments_no_rings() {
        assert!(assemble_rings(&[], 1000).unwrap().is_empty());
    }

    #[test]
    fn dangling_segment_is_an_error() {
        let mut segments = unit_square();
        segments.push(vec![ p(1.0, 1.0), p(5.0, 5.0) ]);

        match assemble_rings(&segments, 1000) {
            Err(AssemblyError::OpenSegment { start, end }) => {
                assert_eq!(p(1.0, 1.0), start);
                assert_eq!(p(5.0, 5.0), end);
            }
            other => panic!("expected OpenSegment, got {:?}", other),
        }
    }

    #[test]
    fn repeated_point_is_a_degenerate_cycle() {
        let mut segments = unit_square();
        segments[0] = vec![ p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.0), p(1.0, 0.0) ];

        match assemble_rings(&segments, 1000) {
            Err(AssemblyError::DegenerateCycle { nodes }) => assert_eq!(vec![ p(0.5, 0.0) ], nodes),
            other => panic!("expected DegenerateCycle, got {:?}", other),
        }
    }

    #[test]
    fn merge_flips_chains() {
        let a = [ p(1.0, 0.0), p(0.0, 0.0) ];
        let b = [ p(1.0, 0.0), p(1.0, 1.0) ];
        let c = [ p(0.0, 0.0), p(1.0, 1.0) ];
        let merged = merge_chains(&[ &a[..], &b[..], &c[..] ]).unwrap();
        assert_eq!(vec![ p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 0.0) ], merged);
    }

    #[test]
    fn merge_rejects_disconnected_chains() {
        let a = [ p(0.0, 0.0), p(1.0, 0.0) ];
        let b = [ p(1.0, 0.0), p(1.0, 1.0) ];
        let c = [ p(7.0, 7.0), p(8.0, 8.0) ];
        assert_eq!(None, merge_chains(&[ &a[..], &b[..], &c[..] ]));
    }
}
