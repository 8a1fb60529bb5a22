//! CLI command implementations.

mod display;

pub mod map;
pub mod partial;

use std::path::{Path, PathBuf};

use orgmap::PackageMembership;
use orgmap::config::{OrgmapConfig, Overrides};
use orgmap::export::GraphWriter;
use orgmap::filter::FilterSpec;
use orgmap::graph::{Graph, GraphBuilder};
use orgmap::progress::{Progress, Stage};
use orgmap::source::{
    DelimitedEdgeFile, EdgeSource, JsonlCatalogFile, JsonlPackageFile, PackageSource, load_inputs,
};
use orgmap::warning::{Warning, WarningCollector};

use crate::InputArgs;

/// Reports pipeline stages through the log.
struct LogProgress;

impl Progress for LogProgress {
    fn start(&self, stage: Stage) {
        tracing::info!("{stage}...");
    }

    fn finish(&self, stage: Stage) {
        tracing::debug!(%stage, "done");
    }
}

/// Inputs and effective configuration of one command invocation.
pub struct Session {
    config: OrgmapConfig,
    catalog: PathBuf,
    files: Vec<PathBuf>,
    packages: Option<PathBuf>,
}

/// The full graph and everything loaded alongside it.
pub struct Loaded {
    pub graph: Graph,
    /// Present only when package info was requested
    pub packages: Option<PackageMembership>,
    /// Loading and building warnings, in the order raised
    pub warnings: Vec<Warning>,
}

impl Session {
    /// Load the configuration file and lay the command-line flags over it.
    pub fn open(
        config_path: Option<&Path>,
        input: InputArgs,
        overrides: Overrides,
    ) -> orgmap::Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = OrgmapConfig::discover(config_path, &cwd)?.apply(overrides);
        Ok(Self {
            config,
            catalog: input.catalog,
            files: input.files,
            packages: input.packages,
        })
    }

    /// The same session with every filter removed.
    pub fn unfiltered(mut self) -> Self {
        self.config.filter = FilterSpec::default();
        self
    }

    /// Load the inputs and build the full graph.
    pub fn build_graph(&self, progress: &dyn Progress) -> orgmap::Result<Loaded> {
        let warnings = WarningCollector::new();
        let catalog = JsonlCatalogFile::new(&self.catalog);
        let edge_sources: Vec<Box<dyn EdgeSource>> = self
            .files
            .iter()
            .map(|path| Box::new(DelimitedEdgeFile::new(path)) as Box<dyn EdgeSource>)
            .collect();
        let package_file = self.packages.as_ref().map(JsonlPackageFile::new);

        let inputs = load_inputs(
            &catalog,
            &edge_sources,
            package_file.as_ref().map(|f| f as &dyn PackageSource),
            progress,
            &warnings,
        )?;
        let graph = GraphBuilder::new(self.config.build_options())
            .with_progress(progress)
            .with_warnings(warnings.clone())
            .build(&inputs.catalog, &inputs.edges);

        Ok(Loaded {
            graph,
            packages: self.packages.is_some().then_some(inputs.packages),
            warnings: warnings.into_warnings(),
        })
    }

    /// Writer for the configured output directory.
    pub fn writer(&self, packages: Option<PackageMembership>) -> GraphWriter {
        let writer = GraphWriter::new(self.config.output_dir()).pretty(self.config.pretty);
        match packages {
            Some(packages) => writer.packages(packages),
            None => writer,
        }
    }
}
