//! # Orgmap: Dependency Graphs of Org Metadata
//!
//! Orgmap turns a catalog of typed metadata components and a list of raw
//! "A references B" records into a directed graph, then carves focused
//! partial graphs out of it.
//!
//! ## Design Philosophy
//!
//! - **Inputs are data** - The catalog and the edges are fully loaded before
//!   building starts; building never does I/O
//! - **Filter once** - Filtering happens while the full graph is built, so
//!   every later step sees only surviving nodes and no dangling edges
//! - **Warnings, not failures** - Unknown edge endpoints are dropped and
//!   reported; only broken inputs and broken caller contracts are errors
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```
//! use orgmap::filter::FilterSpec;
//! use orgmap::graph::{self, Direction};
//! use orgmap::model::{Catalog, Entity, EntityType, ReferenceEdge};
//!
//! let catalog = Catalog::from_entities(vec![
//!     Entity::new("01p1", "InvoiceService", EntityType::ApexClass),
//!     Entity::new("01p2", "TaxCalculator", EntityType::ApexClass),
//!     Entity::new("01p3", "Rounding", EntityType::ApexClass),
//! ]);
//! let edges = vec![
//!     ReferenceEdge::new("01p1", "01p2"),
//!     ReferenceEdge::new("01p2", "01p3"),
//!     ReferenceEdge::new("01p1", "01p3"),
//! ];
//!
//! let (full, warnings) = graph::build(&catalog, &edges, &FilterSpec::default());
//! assert!(warnings.is_empty());
//!
//! let focus = graph::resolve_all(&full, &["ApexClass:InvoiceService"])?;
//! let uses = graph::extract_transitive(&full, &focus[0], Direction::Outgoing, false)?;
//!
//! // 01p1 -> 01p3 is implied by 01p1 -> 01p2 -> 01p3
//! assert_eq!(uses.edge_count(), 2);
//! # Ok::<(), orgmap::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod graph;
pub mod model;
pub mod progress;
pub mod source;
pub mod warning;

pub use config::OrgmapConfig;
pub use error::{Error, ResolutionError, Result};
pub use filter::{FilterSpec, NamespaceMatch};
pub use graph::{BuildOptions, Direction, Graph, GraphBuilder, Node, PartialGraphRequest};
pub use model::{
    Catalog, Entity, EntityId, EntityType, ManageableState, PackageMembership, ReferenceEdge,
};
pub use warning::{Warning, WarningCollector};
