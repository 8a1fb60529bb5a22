//! Input sources for the catalog, the dependency edges and package membership.
//!
//! Graph building is synchronous and works on fully materialized inputs. This
//! module fetches them:
//!
//! - [`CatalogSource`] / [`EdgeSource`] / [`PackageSource`]: where the
//!   inputs come from
//! - [`delimited`]: `;`-delimited dependency exports
//! - [`jsonl`]: catalogs and package membership, one record per line,
//!   skipping lines that do not parse
//! - [`load_inputs`]: fetches every source concurrently
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       load_inputs                        │
//! ├──────────────────────────┬───────────────────────────────┤
//! │  rayon::join             │  rayon::join                  │
//! │    catalog.load_catalog  │    edge_sources.par_iter()    │
//! │                          │    packages.load_packages     │
//! ├──────────────────────────┴───────────────────────────────┤
//! │  Inputs { catalog, edges (in source order), packages }   │
//! └──────────────────────────────────────────────────────────┘
//! ```

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::model::{Catalog, PackageMembership, ReferenceEdge};
use crate::progress::{Progress, Stage, track};
use crate::warning::WarningCollector;

pub mod delimited;
pub mod jsonl;

pub use delimited::DelimitedEdgeFile;
pub use jsonl::{JsonlCatalogFile, JsonlPackageFile};

/// Produces the entity catalog.
pub trait CatalogSource: Send + Sync {
    /// Load every entity. Recoverable problems go to `warnings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read at all.
    fn load_catalog(&self, warnings: &WarningCollector) -> Result<Catalog>;
}

/// Produces raw dependency edges.
pub trait EdgeSource: Send + Sync {
    /// Load every edge, in source order.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or holds a malformed record.
    fn load_edges(&self) -> Result<Vec<ReferenceEdge>>;
}

/// Produces package membership of components.
pub trait PackageSource: Send + Sync {
    /// Load every membership record. Recoverable problems go to `warnings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read at all.
    fn load_packages(&self, warnings: &WarningCollector) -> Result<PackageMembership>;
}

impl CatalogSource for Catalog {
    fn load_catalog(&self, _warnings: &WarningCollector) -> Result<Catalog> {
        Ok(self.clone())
    }
}

impl PackageSource for PackageMembership {
    fn load_packages(&self, _warnings: &WarningCollector) -> Result<PackageMembership> {
        Ok(self.clone())
    }
}

impl EdgeSource for Vec<ReferenceEdge> {
    fn load_edges(&self) -> Result<Vec<ReferenceEdge>> {
        Ok(self.clone())
    }
}

/// Everything a graph build needs.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// The entity catalog
    pub catalog: Catalog,
    /// All edges, concatenated in source order
    pub edges: Vec<ReferenceEdge>,
    /// Package membership; empty when no package source was given
    pub packages: PackageMembership,
}

/// Fetch the catalog, all edge sources and the optional package source
/// concurrently.
///
/// Edges from several sources are concatenated in the order the sources are
/// given, regardless of which finishes first.
///
/// # Errors
///
/// Returns the first error raised by any source. The catalog error wins if
/// several sides fail, then the edge error.
pub fn load_inputs(
    catalog: &dyn CatalogSource,
    edge_sources: &[Box<dyn EdgeSource>],
    packages: Option<&dyn PackageSource>,
    progress: &dyn Progress,
    warnings: &WarningCollector,
) -> Result<Inputs> {
    let (catalog, (edges, packages)) = rayon::join(
        || {
            track(progress, Stage::LoadingCatalog, || {
                catalog.load_catalog(warnings)
            })
        },
        || {
            rayon::join(
                || {
                    track(progress, Stage::LoadingEdges, || {
                        edge_sources
                            .par_iter()
                            .map(|source| source.load_edges())
                            .collect::<Result<Vec<_>>>()
                    })
                },
                || match packages {
                    Some(source) => track(progress, Stage::LoadingPackages, || {
                        source.load_packages(warnings)
                    }),
                    None => Ok(PackageMembership::default()),
                },
            )
        },
    );

    let catalog = catalog?;
    let edges: Vec<ReferenceEdge> = edges?.into_iter().flatten().collect();
    let packages = packages?;
    debug!(
        entities = catalog.len(),
        edges = edges.len(),
        sources = edge_sources.len(),
        packaged = packages.len(),
        "inputs loaded"
    );
    Ok(Inputs {
        catalog,
        edges,
        packages,
    })
}
