use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::geom::{Point, Segment};

// Nodes and edges live in arenas and refer to each other by index, the same
// way Topology does.
pub type NodeId = u32;
pub type EdgeId = u32;

/// A directed hop between two graph nodes.
///
/// `chain` holds every real Point walked from `from` to `to`, both ends
/// included: two Points for a direct hop, more when the edge carries an
/// interior chain.
#[derive(Debug)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub chain: Box<[Point]>,
}

/// Directed graph over the intersection nodes of a set of segments.
///
/// Every stretch of a segment between two consecutive intersection nodes is
/// added in both directions, so cycles can be found no matter which way each
/// way was surveyed. Interior chains of two or more Points get their own
/// first/last nodes: that keeps two different ways between the same pair of
/// intersections from collapsing into one edge.
#[derive(Debug)]
pub struct IntersectionGraph {
    nodes: Vec<Point>,
    edges: Vec<GraphEdge>,
    out_edges: Vec<Vec<EdgeId>>,

    node_ids: HashMap<Point, NodeId>,
    edge_ids: HashMap<(NodeId, NodeId), EdgeId>,
}

/// How many times each Point appears across a batch of segments.
pub fn occurrence_counts(segments: &[Segment]) -> HashMap<Point, usize> {
    let mut counts = HashMap::new();
    for point in segments.iter().flat_map(|s| s.iter()) {
        *counts.entry(*point).or_insert(0) += 1;
    }
    counts
}

impl IntersectionGraph {
    /// Builds the graph. `counts` must come from `occurrence_counts()` over
    /// the same segments.
    pub fn build(segments: &[Segment], counts: &HashMap<Point, usize>) -> IntersectionGraph {
        let mut graph = IntersectionGraph {
            nodes: vec![],
            edges: vec![],
            out_edges: vec![],
            node_ids: HashMap::new(),
            edge_ids: HashMap::new(),
        };

        for segment in segments {
            let mut start: Option<Point> = None;
            let mut interior: Vec<Point> = vec![];

            for &point in segment {
                let is_intersection = counts.get(&point).map_or(false, |&c| c > 1);

                if is_intersection {
                    if let Some(start) = start {
                        graph.add_stretch(start, &interior, point);
                    }
                    interior.clear();
                    start = Some(point);
                } else if start.is_some() {
                    interior.push(point);
                }
            }
        }

        graph
    }

    fn add_stretch(&mut self, start: Point, interior: &[Point], end: Point) {
        match interior.len() {
            0 => {
                self.add_edge(start, end, None);
                self.add_edge(end, start, None);
            }
            1 => {
                let mid = interior[0];
                self.add_edge(start, mid, None);
                self.add_edge(mid, end, None);
                self.add_edge(end, mid, None);
                self.add_edge(mid, start, None);
            }
            _ => {
                let first = interior[0];
                let last = interior[interior.len() - 1];
                let reversed: Vec<Point> = interior.iter().rev().cloned().collect();
                self.add_edge(start, first, None);
                self.add_edge(first, last, Some(interior));
                self.add_edge(last, end, None);
                self.add_edge(end, last, None);
                self.add_edge(last, first, Some(&reversed));
                self.add_edge(first, start, None);
            }
        }
    }

    fn node_id(&mut self, point: Point) -> NodeId {
        let next_id = self.nodes.len() as NodeId;
        match self.node_ids.entry(point) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.nodes.push(point);
                self.out_edges.push(vec![]);
                entry.insert(next_id);
                next_id
            }
        }
    }

    /// Adds an edge unless one already joins the same two nodes.
    fn add_edge(&mut self, from: Point, to: Point, chain: Option<&[Point]>) {
        let from_id = self.node_id(from);
        let to_id = self.node_id(to);
        let next_id = self.edges.len() as EdgeId;

        if let Entry::Vacant(entry) = self.edge_ids.entry((from_id, to_id)) {
            let chain = match chain {
                Some(points) => points.to_vec(),
                None => vec![ from, to ],
            };
            self.edges.push(GraphEdge { from: from_id, to: to_id, chain: chain.into_boxed_slice() });
            self.out_edges[from_id as usize].push(next_id);
            entry.insert(next_id);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, node_id: NodeId) -> Point {
        self.nodes[node_id as usize]
    }

    pub fn edge(&self, edge_id: EdgeId) -> &GraphEdge {
        &self.edges[edge_id as usize]
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn out_edges(&self, node_id: NodeId) -> &[EdgeId] {
        &self.out_edges[node_id as usize]
    }

    pub fn target(&self, edge_id: EdgeId) -> NodeId {
        self.edges[edge_id as usize].to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point { Point(x, y) }

    fn build(segments: &[Segment]) -> IntersectionGraph {
        let counts = occurrence_counts(segments);
        IntersectionGraph::build(segments, &counts)
    }

    #[test]
    fn counts_every_appearance() {
        let segments = vec![
            vec![ p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0) ],
            vec![ p(1.0, 0.0), p(1.0, 1.0) ],
        ];
        let counts = occurrence_counts(&segments);
        assert_eq!(Some(&2), counts.get(&p(1.0, 0.0)));
        assert_eq!(Some(&1), counts.get(&p(2.0, 0.0)));
    }

    #[test]
    fn direct_stretch_adds_two_edges() {
        let graph = build(&[
            vec![ p(0.0, 0.0), p(1.0, 0.0) ],
            vec![ p(1.0, 0.0), p(0.0, 0.0) ],
        ]);

        // Both segments describe the same hop; the second adds nothing.
        assert_eq!(2, graph.node_count());
        assert_eq!(2, graph.edge_count());
    }

    #[test]
    fn single_interior_point_becomes_node() {
        let graph = build(&[
            vec![ p(0.0, 0.0), p(0.5, 0.5), p(1.0, 0.0) ],
            vec![ p(1.0, 0.0), p(0.0, 0.0) ],
        ]);

        assert_eq!(3, graph.node_count());
        assert_eq!(6, graph.edge_count());
        assert!(graph.edges().iter().all(|e| e.chain.len() == 2));
    }

    #[test]
    fn interior_chain_stored_both_ways() {
        let graph = build(&[
            vec![ p(0.0, 0.0), p(0.0, 1.0), p(0.5, 1.5), p(1.0, 1.0), p(1.0, 0.0) ],
            vec![ p(1.0, 0.0), p(0.0, 0.0) ],
        ]);

        assert_eq!(4, graph.node_count());
        assert_eq!(8, graph.edge_count());

        let chains: Vec<&[Point]> = graph.edges().iter()
            .filter(|e| e.chain.len() > 2)
            .map(|e| &e.chain[..])
            .collect();
        assert_eq!(vec![
            &[ p(0.0, 1.0), p(0.5, 1.5), p(1.0, 1.0) ][..],
            &[ p(1.0, 1.0), p(0.5, 1.5), p(0.0, 1.0) ][..],
        ], chains);
    }

    #[test]
    fn points_before_first_intersection_are_ignored() {
        let graph = build(&[
            vec![ p(9.0, 9.0), p(0.0, 0.0), p(1.0, 0.0) ],
            vec![ p(1.0, 0.0), p(0.0, 0.0) ],
        ]);

        assert_eq!(2, graph.node_count());
    }
}
