//! Partial graphs around focus nodes.
//!
//! Two extraction modes:
//!
//! - **Neighborhood**: each focus with its one-hop neighbors in one direction
//! - **Transitive**: everything reachable from a single focus, reduced so that
//!   no edge is implied by a longer path
//!
//! Extraction never touches the full graph. Every result is an independent
//! [`Graph`] holding copies of the selected nodes, with the successor or
//! predecessor flag set on every node reached from a focus.
//!
//! Focus ids must already be resolved. An id missing from the graph is a
//! broken caller contract and fails with [`Error::InvariantViolation`].

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use super::reduce::transitive_reduction;
use super::{Direction, Graph};
use crate::error::{Error, Result};
use crate::model::EntityId;

/// How to extract partial graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialGraphRequest {
    /// Which way to follow edges
    pub direction: Direction,
    /// Merge per-focus neighborhoods into one graph
    pub merge: bool,
    /// Follow edges transitively and reduce the result
    pub transitive: bool,
}

impl PartialGraphRequest {
    /// A one-hop, unmerged request in `direction`.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            merge: false,
            transitive: false,
        }
    }
}

/// Run `request` against `graph`.
///
/// Neighborhood requests return one graph per focus, or one graph when
/// merging. Transitive requests return exactly one graph.
///
/// # Errors
///
/// Fails with [`Error::InvariantViolation`] if a focus id is not in the graph,
/// or if a transitive request does not have exactly one focus.
pub fn extract(
    graph: &Graph,
    focus_ids: &[EntityId],
    request: &PartialGraphRequest,
) -> Result<Vec<Graph>> {
    if request.transitive {
        let [focus] = focus_ids else {
            return Err(Error::InvariantViolation(format!(
                "transitive extraction needs exactly one focus node, got {}",
                focus_ids.len()
            )));
        };
        extract_transitive(graph, focus, request.direction, request.merge).map(|g| vec![g])
    } else {
        extract_neighborhood(graph, focus_ids, request.direction, request.merge)
    }
}

fn focus_index(graph: &Graph, focus: &EntityId) -> Result<NodeIndex> {
    graph.index_of(focus.as_str()).ok_or_else(|| {
        Error::InvariantViolation(format!("focus node {focus} is not in the graph"))
    })
}

/// One-hop neighborhoods around each focus node.
///
/// Each neighborhood holds the focus, its neighbors in `direction` and the
/// edges between the focus and those neighbors, parallel edges included.
/// Without `merge` the result has one graph per focus, in focus order. With
/// `merge` it has a single graph: the union of all neighborhoods, with edges
/// deduplicated by endpoint pair and flags combined.
///
/// An empty `focus_ids` yields an empty list.
///
/// # Errors
///
/// Fails with [`Error::InvariantViolation`] if any focus id is not in the graph.
pub fn extract_neighborhood(
    graph: &Graph,
    focus_ids: &[EntityId],
    direction: Direction,
    merge: bool,
) -> Result<Vec<Graph>> {
    let neighborhoods = focus_ids
        .iter()
        .map(|focus| neighborhood(graph, focus, direction))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        focus = focus_ids.len(),
        ?direction,
        merge,
        "neighborhoods extracted"
    );
    if merge && !neighborhoods.is_empty() {
        Ok(vec![union(&neighborhoods)])
    } else {
        Ok(neighborhoods)
    }
}

fn neighborhood(graph: &Graph, focus: &EntityId, direction: Direction) -> Result<Graph> {
    let idx = focus_index(graph, focus)?;
    let inner = graph.inner();

    let mut partial = Graph::new();
    partial.insert_node(inner[idx].clone());

    for neighbor in graph.adjacent(idx, direction) {
        if neighbor != idx {
            let mut node = inner[neighbor].clone();
            node.mark(direction);
            partial.insert_node(node);
        }
        let (source, target) = match direction {
            Direction::Outgoing => (idx, neighbor),
            Direction::Incoming => (neighbor, idx),
        };
        partial.insert_edge(inner[source].id().as_str(), inner[target].id().as_str());
    }
    Ok(partial)
}

fn union(graphs: &[Graph]) -> Graph {
    let mut merged = Graph::new();
    for graph in graphs {
        for node in graph.nodes() {
            match merged.node_mut(node.id().as_str()) {
                Some(existing) => existing.absorb_flags(node),
                None => {
                    merged.insert_node(node.clone());
                }
            }
        }
        for edge in graph.edges() {
            if !merged.has_edge(edge.source.as_str(), edge.target.as_str()) {
                merged.insert_edge(edge.source.as_str(), edge.target.as_str());
            }
        }
    }
    merged
}

/// Everything reachable from `focus` in `direction`, transitively reduced.
///
/// The graph holds the focus and every node reachable from it, with the edges
/// of the full graph between those nodes (in their original orientation)
/// minus every edge implied by a longer path inside that set. Every node other
/// than the focus is flagged.
///
/// `merge` has no effect: there is only ever one focus. It is accepted so
/// callers can pass the same flags to both extraction modes.
///
/// # Errors
///
/// Fails with [`Error::InvariantViolation`] if `focus` is not in the graph.
pub fn extract_transitive(
    graph: &Graph,
    focus: &EntityId,
    direction: Direction,
    _merge: bool,
) -> Result<Graph> {
    let start = focus_index(graph, focus)?;
    let inner = graph.inner();

    // Breadth-first reachability, focus first
    let mut reached = HashSet::from([start]);
    let mut order = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in graph.adjacent(current, direction) {
            if reached.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }

    let mut induced = Graph::new();
    for &idx in &order {
        let mut node = inner[idx].clone();
        if idx != start {
            node.mark(direction);
        }
        induced.insert_node(node);
    }
    for edge in inner.edge_references() {
        if reached.contains(&edge.source()) && reached.contains(&edge.target()) {
            induced.insert_edge(
                inner[edge.source()].id().as_str(),
                inner[edge.target()].id().as_str(),
            );
        }
    }

    debug!(
        %focus,
        ?direction,
        reachable = order.len() - 1,
        induced_edges = induced.edge_count(),
        "reachability subgraph extracted"
    );
    Ok(transitive_reduction(&induced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::model::{Entity, EntityType};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new();
        for id in ids {
            g.insert_node(Node::new(Entity::new(*id, *id, EntityType::ApexClass)));
        }
        for (s, t) in edges {
            g.insert_edge(s, t);
        }
        g
    }

    fn ids(g: &Graph) -> Vec<&str> {
        g.node_ids().map(EntityId::as_str).collect()
    }

    fn edge_list(g: &Graph) -> Vec<(&str, &str)> {
        g.edges()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    fn focus(ids: &[&str]) -> Vec<EntityId> {
        ids.iter().map(|id| EntityId::from(*id)).collect()
    }

    #[test]
    fn outgoing_neighborhood_flags_successors() {
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("C", "D")]);
        let result = extract_neighborhood(&g, &focus(&["A"]), Direction::Outgoing, false)
            .expect("focus exists");

        assert_eq!(result.len(), 1);
        let partial = &result[0];
        assert_eq!(ids(partial), ["A", "B", "C"]);
        assert_eq!(edge_list(partial), [("A", "B"), ("A", "C")]);
        assert!(!partial.node("A").expect("focus").is_successor());
        assert!(partial.node("B").expect("neighbor").is_successor());
        assert!(!partial.node("B").expect("neighbor").is_predecessor());
    }

    #[test]
    fn neighborhood_excludes_edges_between_neighbors() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("A", "C"), ("B", "C")]);
        let result = extract_neighborhood(&g, &focus(&["A"]), Direction::Outgoing, false)
            .expect("focus exists");

        assert_eq!(edge_list(&result[0]), [("A", "B"), ("A", "C")]);
    }

    #[test]
    fn one_graph_per_focus_without_merge() {
        let g = graph(&["A", "B", "C"], &[("A", "C"), ("B", "C")]);
        let result = extract_neighborhood(&g, &focus(&["A", "B"]), Direction::Outgoing, false)
            .expect("focus exists");

        assert_eq!(result.len(), 2);
        assert_eq!(ids(&result[0]), ["A", "C"]);
        assert_eq!(ids(&result[1]), ["B", "C"]);
    }

    #[test]
    fn merge_unions_and_dedupes() {
        let g = graph(&["A", "B", "C"], &[("A", "C"), ("B", "C"), ("A", "B")]);
        let result = extract_neighborhood(&g, &focus(&["A", "B"]), Direction::Outgoing, true)
            .expect("focus exists");

        assert_eq!(result.len(), 1);
        let merged = &result[0];
        assert_eq!(ids(merged), ["A", "C", "B"]);
        assert_eq!(edge_list(merged), [("A", "C"), ("A", "B"), ("B", "C")]);
        // B is a focus but also A's successor
        assert!(merged.node("B").expect("node").is_successor());
    }

    #[test]
    fn empty_focus_list_is_a_no_op() {
        let g = graph(&["A"], &[]);
        for merge in [false, true] {
            let result =
                extract_neighborhood(&g, &[], Direction::Incoming, merge).expect("no focus");
            assert!(result.is_empty());
        }
    }

    #[test]
    fn unknown_focus_fails_fast() {
        let g = graph(&["A"], &[]);
        let error = extract_neighborhood(&g, &focus(&["A", "Z"]), Direction::Outgoing, false)
            .expect_err("Z is not a node");
        assert!(matches!(error, Error::InvariantViolation(_)));

        let error = extract_transitive(&g, &EntityId::from("Z"), Direction::Outgoing, false)
            .expect_err("Z is not a node");
        assert!(matches!(error, Error::InvariantViolation(_)));
    }

    #[test]
    fn self_loop_keeps_focus_unflagged() {
        let g = graph(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let result = extract_neighborhood(&g, &focus(&["A"]), Direction::Outgoing, false)
            .expect("focus exists");

        let partial = &result[0];
        assert_eq!(partial.edge_count(), 2);
        assert!(!partial.node("A").expect("focus").is_successor());
    }

    #[test]
    fn transitive_outgoing_reduces_shortcut() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let partial =
            extract_transitive(&g, &EntityId::from("A"), Direction::Outgoing, false)
                .expect("focus exists");

        assert_eq!(edge_list(&partial), [("A", "B"), ("B", "C")]);
        assert!(partial.node("B").expect("node").is_successor());
        assert!(partial.node("C").expect("node").is_successor());
        assert!(!partial.node("A").expect("focus").is_successor());
    }

    #[test]
    fn transitive_incoming_keeps_original_orientation() {
        let g = graph(
            &["A", "B", "C", "X"],
            &[("A", "B"), ("B", "C"), ("A", "C"), ("C", "X")],
        );
        let partial =
            extract_transitive(&g, &EntityId::from("C"), Direction::Incoming, false)
                .expect("focus exists");

        assert_eq!(ids(&partial), ["C", "B", "A"]);
        assert_eq!(edge_list(&partial), [("A", "B"), ("B", "C")]);
        assert!(partial.node("A").expect("node").is_predecessor());
        assert!(!partial.contains("X"));
    }

    #[test]
    fn transitive_ignores_paths_outside_reachable_set() {
        // X reaches C but is not reachable from A
        let g = graph(&["A", "C", "X"], &[("A", "C"), ("X", "C"), ("A", "A")]);
        let partial =
            extract_transitive(&g, &EntityId::from("A"), Direction::Outgoing, false)
                .expect("focus exists");

        assert_eq!(edge_list(&partial), [("A", "C")]);
    }

    #[test]
    fn merge_flag_is_ignored_in_transitive_mode() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let plain = extract_transitive(&g, &EntityId::from("A"), Direction::Outgoing, false)
            .expect("focus exists");
        let merged = extract_transitive(&g, &EntityId::from("A"), Direction::Outgoing, true)
            .expect("focus exists");

        assert_eq!(edge_list(&plain), edge_list(&merged));
        assert_eq!(ids(&plain), ids(&merged));
    }

    #[test]
    fn request_rejects_multiple_transitive_focus() {
        let g = graph(&["A", "B"], &[]);
        let request = PartialGraphRequest {
            transitive: true,
            ..PartialGraphRequest::new(Direction::Outgoing)
        };

        let error = extract(&g, &focus(&["A", "B"]), &request).expect_err("two focus nodes");
        assert!(matches!(error, Error::InvariantViolation(_)));

        let single = extract(&g, &focus(&["A"]), &request).expect("one focus");
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn full_graph_is_untouched_by_extraction() {
        let g = graph(&["A", "B"], &[("A", "B")]);
        let _ = extract_neighborhood(&g, &focus(&["A"]), Direction::Outgoing, false)
            .expect("focus exists");

        assert!(g.nodes().all(|n| !n.is_successor() && !n.is_predecessor()));
    }
}
