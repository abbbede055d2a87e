//! Elementary cycles of an IntersectionGraph, via Johnson's algorithm.
//!
//! Both the strongly-connected-component search and the circuit search use
//! explicit stacks: a country's boundary can produce paths thousands of nodes
//! long, and we don't want recursion depth to depend on the input.

use crate::error::AssemblyError;
use super::graph::{EdgeId, IntersectionGraph, NodeId};

/// Returns every elementary cycle in the graph, each as the list of edges
/// walked from its first node back to that node.
///
/// `limit` caps the number of cycles found within one strongly connected
/// component of the original graph.
pub fn elementary_cycles(graph: &IntersectionGraph, limit: usize) -> Result<Vec<Vec<EdgeId>>, AssemblyError> {
    let n = graph.node_count();
    let mut cycles: Vec<Vec<EdgeId>> = graph.edges().iter()
        .enumerate()
        .filter(|&(_, e)| e.from == e.to)
        .map(|(i, _)| vec![ i as EdgeId ])
        .collect();

    let all_nodes: Vec<NodeId> = (0 .. n as NodeId).collect();
    let everything = vec![true; n];

    // (root component index, nodes still to search)
    let mut work: Vec<(usize, Vec<NodeId>)> = vec![];
    let mut roots: Vec<(usize, NodeId)> = vec![]; // (cycles found, a node in it)
    for component in strongly_connected(graph, &all_nodes, &everything) {
        if component.len() > 1 {
            roots.push((0, component[0]));
            work.push((roots.len() - 1, component));
        }
    }

    let mut in_component = vec![false; n];
    let mut search = CircuitSearch::new(n);

    while let Some((root, component)) = work.pop() {
        for &v in &component {
            in_component[v as usize] = true;
        }

        let start = component[0];
        let budget = limit - roots[root].0;
        let found = search.run(graph, start, &in_component, budget, &mut cycles);
        roots[root].0 += found;
        if roots[root].0 > limit {
            return Err(AssemblyError::TooManyCycles { limit, node: graph.node(roots[root].1) });
        }

        in_component[start as usize] = false;
        let rest: Vec<NodeId> = component[1..].to_vec();
        for sub in strongly_connected(graph, &rest, &in_component) {
            if sub.len() > 1 {
                work.push((root, sub));
            }
        }

        for &v in &rest {
            in_component[v as usize] = false;
        }
    }

    Ok(cycles)
}

/// Scratch space for finding the circuits through one start node.
struct CircuitSearch {
    blocked: Vec<bool>,
    blocked_by: Vec<Vec<NodeId>>,
}

struct Frame {
    node: NodeId,
    next: usize,
    closed: bool,
}

impl CircuitSearch {
    fn new(n: usize) -> CircuitSearch {
        CircuitSearch {
            blocked: vec![false; n],
            blocked_by: vec![vec![]; n],
        }
    }

    /// Appends every elementary cycle through `start` that stays inside
    /// `mask` to `out`. Returns how many it found.
    ///
    /// Stops as soon as it has found more than `budget`, so the caller can
    /// fail without enumerating the rest.
    fn run(&mut self, graph: &IntersectionGraph, start: NodeId, mask: &[bool], budget: usize, out: &mut Vec<Vec<EdgeId>>) -> usize {
        let mut found = 0;
        let mut path: Vec<EdgeId> = vec![];
        let mut stack = vec![ Frame { node: start, next: 0, closed: false } ];
        self.blocked[start as usize] = true;

        while let Some(frame) = stack.last_mut() {
            let v = frame.node;
            let out_edges = graph.out_edges(v);

            if frame.next < out_edges.len() {
                let edge_id = out_edges[frame.next];
                frame.next += 1;
                let w = graph.target(edge_id);

                if w == v || !mask[w as usize] {
                    continue;
                }

                if w == start {
                    frame.closed = true;
                    let mut cycle = path.clone();
                    cycle.push(edge_id);
                    out.push(cycle);
                    found += 1;
                    if found > budget {
                        break;
                    }
                } else if !self.blocked[w as usize] {
                    self.blocked[w as usize] = true;
                    path.push(edge_id);
                    stack.push(Frame { node: w, next: 0, closed: false });
                }
            } else {
                let closed = frame.closed;
                if closed {
                    self.unblock(v);
                } else {
                    for &edge_id in out_edges {
                        let w = graph.target(edge_id) as usize;
                        if w != v as usize && mask[w] && !self.blocked_by[w].contains(&v) {
                            self.blocked_by[w].push(v);
                        }
                    }
                }

                stack.pop();
                path.pop();
                if let Some(parent) = stack.last_mut() {
                    parent.closed |= closed;
                }
            }
        }

        // Leave the scratch space clean for the next start node.
        for (blocked, blocked_by) in self.blocked.iter_mut().zip(self.blocked_by.iter_mut()) {
            *blocked = false;
            blocked_by.clear();
        }

        found
    }

    fn unblock(&mut self, node: NodeId) {
        let mut stack = vec![ node ];
        while let Some(u) = stack.pop() {
            if self.blocked[u as usize] {
                self.blocked[u as usize] = false;
                stack.extend(self.blocked_by[u as usize].drain(..));
            }
        }
    }
}

/// Tarjan's strongly connected components over `nodes`, following only edges
/// whose target is in `mask`. Self-loops are ignored.
fn strongly_connected(graph: &IntersectionGraph, nodes: &[NodeId], mask: &[bool]) -> Vec<Vec<NodeId>> {
    let n = graph.node_count();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink: Vec<usize> = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<NodeId> = vec![];
    let mut counter = 0;
    let mut ret = vec![];

    for &root in nodes {
        if index[root as usize].is_some() {
            continue;
        }

        let mut calls: Vec<(NodeId, usize)> = vec![ (root, 0) ];
        index[root as usize] = Some(counter);
        lowlink[root as usize] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root as usize] = true;

        while let Some(call) = calls.last_mut() {
            let v = call.0;
            let out_edges = graph.out_edges(v);

            if call.1 < out_edges.len() {
                let w = graph.target(out_edges[call.1]);
                call.1 += 1;

                if w == v || !mask[w as usize] {
                    continue;
                }

                match index[w as usize] {
                    None => {
                        index[w as usize] = Some(counter);
                        lowlink[w as usize] = counter;
                        counter += 1;
                        stack.push(w);
                        on_stack[w as usize] = true;
                        calls.push((w, 0));
                    }
                    Some(w_index) => {
                        if on_stack[w as usize] {
                            lowlink[v as usize] = lowlink[v as usize].min(w_index);
                        }
                    }
                }
            } else {
                calls.pop();
                if let Some(&(parent, _)) = calls.last() {
                    lowlink[parent as usize] = lowlink[parent as usize].min(lowlink[v as usize]);
                }

                if Some(lowlink[v as usize]) == index[v as usize] {
                    let mut component = vec![];
                    while let Some(w) = stack.pop() {
                        on_stack[w as usize] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    ret.push(component);
                }
            }
        }
    }

    ret
}
