//! Resolving user-supplied node references to node ids.
//!
//! A reference token is either a bare node id or `TYPE:LABEL`. Each reference
//! resolves (or fails) on its own; [`resolve`] reports one result per
//! reference and [`resolve_all`] folds them into all-or-nothing.

use std::collections::HashMap;
use std::fmt;

use super::Graph;
use crate::error::{Error, ResolutionError, Result};
use crate::model::{EntityId, EntityType};

/// A reference to a node, as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeReference {
    /// Look up by type and label
    TypeLabel {
        /// Entity type
        entity_type: EntityType,
        /// Label within that type
        label: String,
    },
    /// Look up by raw id
    Id(String),
}

impl NodeReference {
    /// Parse a reference token.
    ///
    /// `TYPE:LABEL` becomes [`NodeReference::TypeLabel`] and a token without a
    /// colon becomes [`NodeReference::Id`].
    ///
    /// # Errors
    ///
    /// A token with more than two colon-separated parts is
    /// [`ResolutionError::Malformed`]; an unknown type name is
    /// [`ResolutionError::NotFound`], since no node can carry it.
    pub fn parse(token: &str) -> std::result::Result<Self, ResolutionError> {
        let parts: Vec<&str> = token.split(':').collect();
        match parts.as_slice() {
            [id] => Ok(Self::Id((*id).to_string())),
            [type_name, label] => {
                let entity_type =
                    type_name
                        .parse::<EntityType>()
                        .map_err(|_| ResolutionError::NotFound {
                            reference: token.to_string(),
                        })?;
                Ok(Self::TypeLabel {
                    entity_type,
                    label: (*label).to_string(),
                })
            }
            _ => Err(ResolutionError::Malformed {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for NodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeLabel { entity_type, label } => write!(f, "{entity_type}:{label}"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// Index of node ids by (type, label), in node order.
struct LabelIndex<'g> {
    by_label: HashMap<(EntityType, &'g str), Vec<&'g EntityId>>,
}

impl<'g> LabelIndex<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut by_label: HashMap<_, Vec<_>> = HashMap::new();
        for node in graph.nodes() {
            by_label
                .entry((node.entity_type(), node.label()))
                .or_default()
                .push(node.id());
        }
        Self { by_label }
    }

    fn lookup(&self, entity_type: EntityType, label: &'g str) -> &[&'g EntityId] {
        self.by_label
            .get(&(entity_type, label))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn resolve_with(
    graph: &Graph,
    labels: &LabelIndex<'_>,
    reference: &NodeReference,
) -> std::result::Result<EntityId, ResolutionError> {
    match reference {
        NodeReference::Id(id) => graph
            .node(id)
            .map(|n| n.id().clone())
            .ok_or_else(|| ResolutionError::NotFound {
                reference: reference.to_string(),
            }),
        NodeReference::TypeLabel { entity_type, label } => {
            match labels.lookup(*entity_type, label) {
                [] => Err(ResolutionError::NotFound {
                    reference: reference.to_string(),
                }),
                [id] => Ok((*id).clone()),
                many => Err(ResolutionError::Ambiguous {
                    reference: reference.to_string(),
                    candidates: many.iter().map(ToString::to_string).collect(),
                }),
            }
        }
    }
}

/// Resolve each reference independently against `graph`.
///
/// The result has one entry per reference, in the same order.
#[must_use]
pub fn resolve(
    graph: &Graph,
    references: &[NodeReference],
) -> Vec<std::result::Result<EntityId, ResolutionError>> {
    if references.is_empty() {
        return Vec::new();
    }
    let labels = LabelIndex::new(graph);
    references
        .iter()
        .map(|reference| resolve_with(graph, &labels, reference))
        .collect()
}

/// Parse and resolve reference tokens, all or nothing.
///
/// # Errors
///
/// Returns [`Error::Resolution`] carrying every failed token, in input order,
/// if any token fails to parse or resolve.
pub fn resolve_all<S: AsRef<str>>(graph: &Graph, tokens: &[S]) -> Result<Vec<EntityId>> {
    let labels = LabelIndex::new(graph);
    let mut resolved = Vec::with_capacity(tokens.len());
    let mut failures = Vec::new();

    for token in tokens {
        match NodeReference::parse(token.as_ref())
            .and_then(|reference| resolve_with(graph, &labels, &reference))
        {
            Ok(id) => resolved.push(id),
            Err(e) => failures.push(e),
        }
    }

    if failures.is_empty() {
        Ok(resolved)
    } else {
        Err(Error::Resolution(failures))
    }
}
