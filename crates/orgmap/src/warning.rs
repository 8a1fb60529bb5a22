//! Non-fatal warnings raised while loading inputs and building graphs.
//!
//! Dependency exports are often stale or drawn from a different slice of the
//! org than the metadata catalog, so a reference to an unknown component is
//! expected rather than exceptional. Such conditions are reported as
//! [`Warning`] values and processing continues.
//!
//! # Examples
//!
//! ```
//! use orgmap::warning::{Warning, WarningCollector};
//!
//! let collector = WarningCollector::new();
//! collector.add(Warning::DanglingEdge {
//!     source_id: "01p000000000001".to_string(),
//!     target_id: "01p000000000002".to_string(),
//!     missing: vec!["01p000000000002".to_string()],
//! });
//!
//! let warnings = collector.into_warnings();
//! assert_eq!(warnings.len(), 1);
//! assert_eq!(warnings[0].kind(), "dangling_edge");
//! ```

use std::sync::{Arc, Mutex};

/// A non-fatal condition that was recovered from locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An edge references a node absent from the filtered node set and was dropped.
    DanglingEdge {
        /// Referencing component id
        source_id: String,
        /// Referenced component id
        target_id: String,
        /// The endpoint ids that are not in the graph (one or both)
        missing: Vec<String>,
    },

    /// A second entity with an already used id was ignored.
    DuplicateEntity {
        /// The repeated id
        id: String,
    },

    /// A catalog line could not be parsed and was skipped.
    MalformedCatalogLine {
        /// The 1-based line number
        line_number: usize,
        /// The parse error
        error: String,
    },

    /// A package membership line could not be parsed and was skipped.
    MalformedPackageLine {
        /// The 1-based line number
        line_number: usize,
        /// The parse error
        error: String,
    },
}

impl Warning {
    /// Returns a human-readable description of the warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use orgmap::warning::Warning;
    ///
    /// let warning = Warning::MalformedCatalogLine {
    ///     line_number: 5,
    ///     error: "missing field `id`".to_string(),
    /// };
    /// assert!(warning.description().contains("line 5"));
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::DanglingEdge {
                source_id,
                target_id,
                missing,
            } => format!(
                "edge {source_id} -> {target_id} dropped: unknown node(s) {}",
                missing.join(", ")
            ),
            Self::DuplicateEntity { id } => format!("duplicate entity id {id} ignored"),
            Self::MalformedCatalogLine { line_number, error } => {
                format!("catalog line {line_number}: skipped: {error}")
            }
            Self::MalformedPackageLine { line_number, error } => {
                format!("package membership line {line_number}: skipped: {error}")
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DanglingEdge { .. } => "dangling_edge",
            Self::DuplicateEntity { .. } => "duplicate_entity",
            Self::MalformedCatalogLine { .. } => "malformed_catalog_line",
            Self::MalformedPackageLine { .. } => "malformed_package_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A thread-safe collector for warnings.
///
/// Clones share the same underlying list, so one collector can be handed to
/// the catalog loader and the edge loader running on different threads.
///
/// # Mutex Poisoning
///
/// All methods panic if the internal mutex is poisoned, which only happens if
/// another thread panicked while holding the lock.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Creates a new empty `WarningCollector`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning to the collector and logs it.
    pub fn add(&self, warning: Warning) {
        tracing::warn!(kind = warning.kind(), "{warning}");
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .push(warning);
    }

    /// Returns the number of warnings collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .len()
    }

    /// Returns `true` if no warnings have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of all collected warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .clone()
    }

    /// Number of warnings of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .iter()
            .filter(|w| w.kind() == kind)
            .count()
    }

    /// Consumes the collector and returns the warnings.
    ///
    /// If other clones are still alive the warnings are copied out instead.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        match Arc::try_unwrap(self.warnings) {
            Ok(mutex) => mutex
                .into_inner()
                .expect("warning collector mutex should not be poisoned"),
            Err(shared) => shared
                .lock()
                .expect("warning collector mutex should not be poisoned")
                .clone(),
        }
    }
}
