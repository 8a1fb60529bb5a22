//! Optional progress notifications.
//!
//! Long-running steps report the stage they enter and leave through a
//! [`Progress`] implementation supplied by the caller. The library never
//! prints anything itself.

use std::fmt;

/// A step of the map pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the entity catalog
    LoadingCatalog,
    /// Reading dependency records
    LoadingEdges,
    /// Reading package membership
    LoadingPackages,
    /// Assembling the full graph
    BuildingGraph,
    /// Computing partial graphs
    Extracting,
    /// Writing output documents
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoadingCatalog => "loading metadata catalog",
            Self::LoadingEdges => "loading dependencies",
            Self::LoadingPackages => "loading packages info",
            Self::BuildingGraph => "creating graph",
            Self::Extracting => "extracting partial graphs",
            Self::Writing => "writing graph files",
        })
    }
}

/// Receives stage notifications. Both methods default to doing nothing.
pub trait Progress: Send + Sync {
    /// Called when a stage begins.
    fn start(&self, _stage: Stage) {}

    /// Called when a stage completes.
    fn finish(&self, _stage: Stage) {}
}

/// A [`Progress`] that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Run `f` between `start` and `finish` notifications for `stage`.
pub fn track<T>(progress: &dyn Progress, stage: Stage, f: impl FnOnce() -> T) -> T {
    progress.start(stage);
    let result = f();
    progress.finish(stage);
    result
}
