//! Graph model and graph operations.
//!
//! This module provides:
//! - [`Graph`]: nodes keyed by entity id plus an ordered edge list
//! - [`builder`]: assembling the full graph from a catalog and raw edges
//! - [`resolve`]: turning user-supplied references into node ids
//! - [`partial`]: neighborhood and transitive partial graphs
//! - [`reduce`]: transitive reduction of a reachability subgraph
//!
//! ## Design
//!
//! - Petgraph's `DiGraph` is the arena; a `HashMap<EntityId, NodeIndex>`
//!   maps ids to indices, so cycles need no shared ownership
//! - Nodes and edges are never removed, so indices are stable and iteration
//!   follows insertion order
//! - A `Graph` has no public mutators. Once built it is read-only and can be
//!   shared across threads by reference

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use crate::model::{Entity, EntityId, EntityType};

pub mod builder;
pub mod partial;
pub mod reduce;
pub mod resolve;

pub use builder::{BuildOptions, GraphBuilder, build};
pub use partial::{PartialGraphRequest, extract, extract_neighborhood, extract_transitive};
pub use resolve::{NodeReference, resolve, resolve_all};

/// Which way to follow edges from a focus node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow edges away from the focus: what the focus uses
    Outgoing,
    /// Follow edges toward the focus: what depends on the focus
    Incoming,
}

impl Direction {
    pub(crate) fn as_petgraph(self) -> petgraph::Direction {
        match self {
            Self::Outgoing => petgraph::Direction::Outgoing,
            Self::Incoming => petgraph::Direction::Incoming,
        }
    }
}

/// A graph node: an entity plus the flags set by partial extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    entity: Entity,
    is_successor: bool,
    is_predecessor: bool,
}

impl Node {
    pub(crate) fn new(entity: Entity) -> Self {
        Self {
            entity,
            is_successor: false,
            is_predecessor: false,
        }
    }

    /// Node id (the entity id).
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.entity.id
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.entity.label
    }

    /// Type tag.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity.entity_type()
    }

    /// The underlying entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Set when the node was reached by following outgoing edges from a focus.
    #[must_use]
    pub fn is_successor(&self) -> bool {
        self.is_successor
    }

    /// Set when the node was reached by following incoming edges to a focus.
    #[must_use]
    pub fn is_predecessor(&self) -> bool {
        self.is_predecessor
    }

    pub(crate) fn mark(&mut self, direction: Direction) {
        match direction {
            Direction::Outgoing => self.is_successor = true,
            Direction::Incoming => self.is_predecessor = true,
        }
    }

    pub(crate) fn absorb_flags(&mut self, other: &Node) {
        self.is_successor |= other.is_successor;
        self.is_predecessor |= other.is_predecessor;
    }
}

/// A borrowed view of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView<'a> {
    /// Referencing node
    pub source: &'a EntityId,
    /// Referenced node
    pub target: &'a EntityId,
}

/// A directed graph of entities.
///
/// Every stored edge has both endpoints in the node set.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: DiGraph<Node, ()>,
    index: HashMap<EntityId, NodeIndex>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns `false` (and changes nothing) if the id exists.
    pub(crate) fn insert_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(node.id()) {
            return false;
        }
        let id = node.id().clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Insert an edge. Returns `false` (and changes nothing) if an endpoint is missing.
    pub(crate) fn insert_edge(&mut self, source: &str, target: &str) -> bool {
        match (self.index.get(source), self.index.get(target)) {
            (Some(&s), Some(&t)) => {
                self.inner.add_edge(s, t, ());
                true
            }
            _ => false,
        }
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.index.get(id)?;
        self.inner.node_weight_mut(idx)
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Neighbors of `idx` in `direction`, one per edge, in edge insertion order.
    pub(crate) fn adjacent(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(idx, direction.as_petgraph())
            .collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| match direction {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            })
            .collect()
    }

    pub(crate) fn inner(&self) -> &DiGraph<Node, ()> {
        &self.inner
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.inner[idx])
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_indices().map(|idx| &self.inner[idx])
    }

    /// Iterate edges in insertion order. Parallel edges appear once each.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.inner.edge_references().map(|e| EdgeView {
            source: self.inner[e.source()].id(),
            target: self.inner[e.target()].id(),
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Whether at least one edge runs from `source` to `target`.
    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(s), Some(t)) => self.inner.contains_edge(s, t),
            _ => false,
        }
    }

    /// Ids of the one-hop neighbors of `id` in `direction`, deduplicated,
    /// in edge insertion order.
    #[must_use]
    pub fn neighbors(&self, id: &str, direction: Direction) -> Vec<&EntityId> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        self.adjacent(idx, direction)
            .into_iter()
            .filter(|n| seen.insert(*n))
            .map(|n| self.inner[n].id())
            .collect()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.nodes().map(Node::id)
    }
}
