//! Error types for orgmap operations.
//!
//! Errors are split by how far they reach:
//!
//! - **`Error`**: Aborts the operation that raised it (unreadable input,
//!   malformed edge records, a broken caller contract)
//! - **`ResolutionError`**: Raised per node reference, so the caller decides
//!   whether one bad reference aborts the whole extraction
//!
//! Dangling edges are not errors at all. The builder drops them and records a
//! [`Warning`](crate::warning::Warning) instead.

use std::path::Path;
use thiserror::Error;

/// Result type for orgmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for orgmap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited reader failed below the record level
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// An input record is missing required fields or has the wrong shape
    #[error("malformed input in {source_name} at line {line}: {message}")]
    MalformedInput {
        /// File or stream the record came from
        source_name: String,
        /// 1-based line number of the record
        line: usize,
        /// What is wrong with the record
        message: String,
    },

    /// One or more node references could not be resolved
    #[error("{} node reference(s) could not be resolved", .0.len())]
    Resolution(Vec<ResolutionError>),

    /// A caller broke a precondition of the operation
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Create a malformed input error for a record in `path`.
    #[must_use]
    pub fn malformed(path: &Path, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: path.display().to_string(),
            line,
            message: message.into(),
        }
    }
}

/// Failure to resolve a single node reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No node matches the reference
    #[error("no node matches \"{reference}\"")]
    NotFound {
        /// The reference as the user wrote it
        reference: String,
    },

    /// More than one node carries the same type and label
    #[error("\"{reference}\" is ambiguous: matches {}", candidates.join(", "))]
    Ambiguous {
        /// The reference as the user wrote it
        reference: String,
        /// Ids of every matching node
        candidates: Vec<String>,
    },

    /// The token has more than two colon-separated parts
    #[error("no node matches malformed reference \"{token}\"")]
    Malformed {
        /// The raw token
        token: String,
    },
}

impl ResolutionError {
    /// Returns `true` for errors in the not-found class.
    ///
    /// Malformed tokens count as not found: they can never name a node.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Malformed { .. })
    }

    /// The reference text that failed.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::NotFound { reference } | Self::Ambiguous { reference, .. } => reference,
            Self::Malformed { token } => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn malformed_counts_as_not_found() {
        let error = ResolutionError::Malformed {
            token: "A:B:C".to_string(),
        };
        assert!(error.is_not_found());
        assert_eq!(error.reference(), "A:B:C");
    }

    #[test]
    fn ambiguous_is_not_in_not_found_class() {
        let error = ResolutionError::Ambiguous {
            reference: "ApexClass:Foo".to_string(),
            candidates: vec!["01p1".to_string(), "01p2".to_string()],
        };
        assert!(!error.is_not_found());
        let display = error.to_string();
        assert!(display.contains("01p1"));
        assert!(display.contains("01p2"));
    }

    #[test]
    fn malformed_input_display_includes_location() {
        let error = Error::malformed(&PathBuf::from("deps.csv"), 7, "expected 9 columns");
        let display = error.to_string();
        assert!(display.contains("deps.csv"));
        assert!(display.contains("line 7"));
        assert!(display.contains("expected 9 columns"));
    }

    #[test]
    fn resolution_error_counts_failures() {
        let error = Error::Resolution(vec![
            ResolutionError::NotFound {
                reference: "x".to_string(),
            },
            ResolutionError::NotFound {
                reference: "y".to_string(),
            },
        ]);
        assert!(error.to_string().starts_with("2 node reference(s)"));
    }
}
