//! Transitive reduction of a reachability subgraph.
//!
//! The result keeps every node and a subset of the edges such that reachability
//! between any two nodes is unchanged and no kept edge is implied by the
//! others. Parallel edges and self-loops never contribute to reachability, so
//! they are always dropped.
//!
//! ## Complexity
//!
//! | Input | Algorithm | Cost |
//! |-------|-----------|------|
//! | Acyclic | Memoized descendant sets in reverse topological order | O(V·E) time, O(V²) memory worst case |
//! | Cyclic | Per-edge alternate path search, removing edges one at a time | O(E·(V+E)) |
//!
//! Dependency graphs are overwhelmingly acyclic, so the memoized path is the
//! common one. On a DAG both paths give the same, unique reduction.

use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use super::Graph;

/// Distinct non-loop edges of `graph`, in insertion order.
fn distinct_edges(graph: &Graph) -> Vec<(NodeIndex, NodeIndex)> {
    let inner = graph.inner();
    let mut seen = HashSet::new();
    inner
        .edge_indices()
        .filter_map(|e| inner.edge_endpoints(e))
        .filter(|(s, t)| s != t && seen.insert((*s, *t)))
        .collect()
}

/// Copy of `graph` holding only `edges`.
fn with_edges(graph: &Graph, edges: &[(NodeIndex, NodeIndex)]) -> Graph {
    let inner = graph.inner();
    let mut reduced = Graph::new();
    for node in graph.nodes() {
        reduced.insert_node(node.clone());
    }
    for &(s, t) in edges {
        reduced.insert_edge(inner[s].id().as_str(), inner[t].id().as_str());
    }
    reduced
}

/// Compute the transitive reduction of `graph`.
#[must_use]
pub fn transitive_reduction(graph: &Graph) -> Graph {
    let edges = distinct_edges(graph);
    let kept = match toposort(graph.inner(), None) {
        Ok(order) => reduce_acyclic(graph.node_count(), &edges, &order),
        Err(cycle) => {
            debug!(
                node = %graph.inner()[cycle.node_id()].id(),
                "cycle in reachability subgraph, reducing edge by edge"
            );
            reduce_cyclic(graph.node_count(), &edges)
        }
    };

    debug!(
        before = graph.edge_count(),
        after = kept.len(),
        "transitive reduction"
    );
    with_edges(graph, &kept)
}

fn children_of(node_count: usize, edges: &[(NodeIndex, NodeIndex)]) -> Vec<Vec<NodeIndex>> {
    let mut children = vec![Vec::new(); node_count];
    for &(s, t) in edges {
        children[s.index()].push(t);
    }
    children
}

fn reduce_acyclic(
    node_count: usize,
    edges: &[(NodeIndex, NodeIndex)],
    order: &[NodeIndex],
) -> Vec<(NodeIndex, NodeIndex)> {
    let children = children_of(node_count, edges);

    // descendants[v]: every node reachable from v by a path of length >= 1
    let mut descendants: Vec<HashSet<NodeIndex>> = vec![HashSet::new(); node_count];
    for &v in order.iter().rev() {
        let mut reach = HashSet::new();
        for &w in &children[v.index()] {
            reach.insert(w);
            reach.extend(descendants[w.index()].iter().copied());
        }
        descendants[v.index()] = reach;
    }

    edges
        .iter()
        .copied()
        .filter(|&(u, v)| {
            !children[u.index()]
                .iter()
                .any(|&w| w != v && descendants[w.index()].contains(&v))
        })
        .collect()
}

fn reduce_cyclic(
    node_count: usize,
    edges: &[(NodeIndex, NodeIndex)],
) -> Vec<(NodeIndex, NodeIndex)> {
    let mut adjacency: Vec<Vec<(usize, NodeIndex)>> = vec![Vec::new(); node_count];
    for (i, &(s, t)) in edges.iter().enumerate() {
        adjacency[s.index()].push((i, t));
    }
    let mut kept = vec![true; edges.len()];

    for (i, &(u, v)) in edges.iter().enumerate() {
        kept[i] = false;
        if !reaches(&adjacency, &kept, u, v) {
            kept[i] = true;
        }
    }

    edges
        .iter()
        .zip(kept)
        .filter_map(|(edge, keep)| keep.then_some(*edge))
        .collect()
}

/// Breadth-first search over the kept edges only.
fn reaches(
    adjacency: &[Vec<(usize, NodeIndex)>],
    kept: &[bool],
    from: NodeIndex,
    to: NodeIndex,
) -> bool {
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        for &(edge, next) in &adjacency[current.index()] {
            if !kept[edge] {
                continue;
            }
            if next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
