//! Inclusion and exclusion filters applied while building a graph.
//!
//! A filter has three dimensions: type, namespace and manageable state. For
//! each dimension the include list wins; the exclude list is only consulted
//! when no include list is set for that dimension.

use serde::{Deserialize, Serialize};

use crate::model::{Entity, EntityType, ManageableState};

/// One entry of a namespace filter.
///
/// Written as a plain string in configuration files and on the command line;
/// the empty string stands for [`NamespaceMatch::NoNamespace`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NamespaceMatch {
    /// Matches entities without a namespace prefix
    NoNamespace,
    /// Matches entities with exactly this namespace prefix
    Named(String),
}

impl NamespaceMatch {
    /// Whether an entity with namespace `namespace` matches this entry.
    #[must_use]
    pub fn matches(&self, namespace: Option<&str>) -> bool {
        match (self, namespace) {
            (Self::NoNamespace, None) => true,
            (Self::Named(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for NamespaceMatch {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::NoNamespace
        } else {
            Self::Named(s.to_string())
        }
    }
}

impl From<String> for NamespaceMatch {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::NoNamespace
        } else {
            Self::Named(s)
        }
    }
}

impl From<NamespaceMatch> for String {
    fn from(m: NamespaceMatch) -> Self {
        match m {
            NamespaceMatch::NoNamespace => String::new(),
            NamespaceMatch::Named(name) => name,
        }
    }
}

/// Which entities become graph nodes.
///
/// The default filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterSpec {
    /// Keep only these types
    pub include_types: Option<Vec<EntityType>>,
    /// Drop these types (ignored when `include_types` is set)
    pub exclude_types: Option<Vec<EntityType>>,
    /// Keep only these namespaces
    pub include_namespaces: Option<Vec<NamespaceMatch>>,
    /// Drop these namespaces (ignored when `include_namespaces` is set)
    pub exclude_namespaces: Option<Vec<NamespaceMatch>>,
    /// Keep only these manageable states
    pub include_states: Option<Vec<ManageableState>>,
    /// Drop these manageable states (ignored when `include_states` is set)
    pub exclude_states: Option<Vec<ManageableState>>,
}

/// Evaluate one dimension: include wins, exclude is the fallback.
fn passes<T>(include: Option<&[T]>, exclude: Option<&[T]>, matches: impl Fn(&T) -> bool) -> bool {
    match (include, exclude) {
        (Some(include), _) => include.iter().any(&matches),
        (None, Some(exclude)) => !exclude.iter().any(&matches),
        (None, None) => true,
    }
}

impl FilterSpec {
    /// A filter that keeps only the given types.
    #[must_use]
    pub fn include_types(types: impl IntoIterator<Item = EntityType>) -> Self {
        Self {
            include_types: Some(types.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Whether the filter lets every entity through.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `entity` passes every dimension of the filter.
    #[must_use]
    pub fn accepts(&self, entity: &Entity) -> bool {
        let entity_type = entity.entity_type();
        let namespace = entity.namespace();
        let state = entity.manageable_state();

        passes(
            self.include_types.as_deref(),
            self.exclude_types.as_deref(),
            |t| *t == entity_type,
        ) && passes(
            self.include_namespaces.as_deref(),
            self.exclude_namespaces.as_deref(),
            |ns| ns.matches(namespace),
        ) && passes(
            self.include_states.as_deref(),
            self.exclude_states.as_deref(),
            |s| Some(*s) == state,
        )
    }

    /// Lay `overrides` over `self`, one dimension at a time.
    ///
    /// A dimension set in `overrides` (include or exclude) replaces that whole
    /// dimension of `self`, so a command-line exclude list is never shadowed
    /// by an include list from a configuration file.
    #[must_use]
    pub fn overlay(self, overrides: Self) -> Self {
        let (include_types, exclude_types) =
            if overrides.include_types.is_some() || overrides.exclude_types.is_some() {
                (overrides.include_types, overrides.exclude_types)
            } else {
                (self.include_types, self.exclude_types)
            };
        let (include_namespaces, exclude_namespaces) =
            if overrides.include_namespaces.is_some() || overrides.exclude_namespaces.is_some() {
                (overrides.include_namespaces, overrides.exclude_namespaces)
            } else {
                (self.include_namespaces, self.exclude_namespaces)
            };
        let (include_states, exclude_states) =
            if overrides.include_states.is_some() || overrides.exclude_states.is_some() {
                (overrides.include_states, overrides.exclude_states)
            } else {
                (self.include_states, self.exclude_states)
            };

        Self {
            include_types,
            exclude_types,
            include_namespaces,
            exclude_namespaces,
            include_states,
            exclude_states,
        }
    }
}
