//! Cycle detection over the dependency graph.
//!
//! Depth-first search with a visited set and a recursion stack, driven by an
//! explicit frame stack so deep graphs cannot overflow the call stack. Every
//! node is used as a root in turn, so disjoint cycles are all reported.
//!
//! Which paths the search reports depends on node order, but membership does
//! not: it comes from the strongly connected components, and any member the
//! search missed gets a shortest cycle of its own.

use crate::domain::DependencyKind;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// One DFS frame: the node being explored and its remaining neighbors.
struct Frame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    cursor: usize,
}

impl Frame {
    fn new(graph: &DiGraph<String, DependencyKind>, node: NodeIndex) -> Self {
        Self {
            node,
            neighbors: graph
                .neighbors_directed(node, Direction::Outgoing)
                .collect(),
            cursor: 0,
        }
    }
}

/// Find the cycles in `graph`.
///
/// Each cycle is the ordered sequence of component names from its entry node
/// back to that node, so `A -> B -> A` is reported as `["A", "B", "A"]` and a
/// self-dependency as `["A", "A"]`. Cycles are rotated to start at their
/// smallest name and reported once.
pub(crate) fn find_cycles(graph: &DiGraph<String, DependencyKind>) -> Vec<Vec<String>> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut rec_stack: HashSet<NodeIndex> = HashSet::new();
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut raw: Vec<Vec<NodeIndex>> = Vec::new();

    for root in graph.node_indices() {
        if visited.contains(&root) {
            continue;
        }

        let mut stack = vec![Frame::new(graph, root)];
        visited.insert(root);
        rec_stack.insert(root);
        path.push(root);

        while let Some(frame) = stack.last_mut() {
            if let Some(&next) = frame.neighbors.get(frame.cursor) {
                frame.cursor += 1;
                if !visited.contains(&next) {
                    visited.insert(next);
                    rec_stack.insert(next);
                    path.push(next);
                    stack.push(Frame::new(graph, next));
                } else if rec_stack.contains(&next) {
                    // Back edge: the cycle is the path suffix starting at `next`
                    if let Some(pos) = path.iter().position(|&n| n == next) {
                        raw.push(path[pos..].to_vec());
                    }
                }
            } else {
                rec_stack.remove(&frame.node);
                path.pop();
                stack.pop();
            }
        }
    }

    let mut covered: HashSet<NodeIndex> = raw.iter().flatten().copied().collect();
    for scc in cyclic_components(graph) {
        let mut uncovered: Vec<NodeIndex> = scc
            .iter()
            .copied()
            .filter(|node| !covered.contains(node))
            .collect();
        uncovered.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
        for node in uncovered {
            if covered.contains(&node) {
                continue;
            }
            if let Some(cycle) = shortest_cycle_through(graph, node, &scc) {
                covered.extend(cycle.iter().copied());
                raw.push(cycle);
            }
        }
    }

    let raw_count = raw.len();
    let cycles = deduplicate(graph, raw);

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        raw_cycles = raw_count,
        unique_cycles = cycles.len(),
        "Cycle detection complete"
    );

    cycles
}

/// Names of every component that lies on some cycle.
///
/// A component is a member when its strongly connected component has more
/// than one node or when it depends on itself.
pub(crate) fn cycle_members(graph: &DiGraph<String, DependencyKind>) -> BTreeSet<String> {
    cyclic_components(graph)
        .into_iter()
        .flatten()
        .map(|node| graph[node].clone())
        .collect()
}

/// Strongly connected components that contain a cycle.
fn cyclic_components(graph: &DiGraph<String, DependencyKind>) -> Vec<HashSet<NodeIndex>> {
    tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&n| graph.contains_edge(n, n)))
        .map(|scc| scc.into_iter().collect())
        .collect()
}

/// Shortest path from `start` back to itself that stays inside `scc`.
///
/// Returned open, starting at `start`.
fn shortest_cycle_through(
    graph: &DiGraph<String, DependencyKind>,
    start: NodeIndex,
    scc: &HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            if next == start {
                let mut cycle = vec![node];
                let mut current = node;
                while current != start {
                    current = *parent.get(&current)?;
                    cycle.push(current);
                }
                cycle.reverse();
                return Some(cycle);
            }
            if scc.contains(&next) && !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Convert node cycles to name cycles, dropping repeated discoveries.
fn deduplicate(
    graph: &DiGraph<String, DependencyKind>,
    cycles: Vec<Vec<NodeIndex>>,
) -> Vec<Vec<String>> {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut unique = Vec::new();

    for cycle in cycles {
        let names: Vec<String> = cycle.iter().map(|&n| graph[n].clone()).collect();
        let normalized = normalize_cycle(&names);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }

        let mut closed = normalized;
        if let Some(first) = closed.first().cloned() {
            closed.push(first);
        }
        unique.push(closed);
    }

    unique
}

/// Rotate an open cycle so its smallest name comes first.
///
/// Direction is preserved: `A -> B -> C` and `A -> C -> B` are different
/// cycles in a directed graph.
fn normalize_cycle(cycle: &[String]) -> Vec<String> {
    let Some(min_idx) = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(idx, _)| idx)
    else {
        return Vec::new();
    };

    let mut normalized = Vec::with_capacity(cycle.len());
    normalized.extend_from_slice(&cycle[min_idx..]);
    normalized.extend_from_slice(&cycle[..min_idx]);
    normalized
}
