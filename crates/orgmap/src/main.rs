//! Orgmap CLI - dependency graphs of org metadata from the command line.
//!
//! Reads a JSONL metadata catalog and one or more `;`-delimited dependency
//! exports, and writes JSON node-link graph documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use orgmap::config::Overrides;
use orgmap::filter::{FilterSpec, NamespaceMatch};
use orgmap::graph::{Direction, PartialGraphRequest};
use orgmap::model::{EntityType, ManageableState};
use tracing_subscriber::EnvFilter;

mod cli;

/// Orgmap: dependency graphs of org metadata.
#[derive(Parser)]
#[command(name = "orgmap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./orgmap.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full, unfiltered graph of the org
    Org {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write the full graph, filtered by type, namespace and state
    Metadata {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Write partial graphs of what the given components use
    Uses {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        partial: PartialArgs,
    },

    /// Write partial graphs of what depends on the given components
    Dependencies {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        partial: PartialArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Metadata catalog, one JSON entity per line
    #[arg(short, long)]
    catalog: PathBuf,

    /// Dependency exports (`;`-delimited), in order
    #[arg(short, long, required = true, value_delimiter = ',')]
    files: Vec<PathBuf>,

    /// Package membership, one JSON record per line; adds package info to nodes
    #[arg(short = 'p', long, visible_alias = "include-package-info", value_name = "FILE")]
    packages: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory to write graph files to
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Link custom fields to the objects they belong to
    #[arg(long)]
    link_fields: bool,

    /// Link objects back to the triggers that reference them
    #[arg(long)]
    link_triggers: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep only these types
    #[arg(short = 't', long, value_delimiter = ',')]
    include_types: Vec<EntityType>,

    /// Drop these types
    #[arg(long, value_delimiter = ',')]
    exclude_types: Vec<EntityType>,

    /// Keep only these namespaces ("" for no namespace)
    #[arg(short = 'n', long, value_delimiter = ',')]
    include_namespaces: Vec<String>,

    /// Drop these namespaces ("" for no namespace)
    #[arg(long, value_delimiter = ',')]
    exclude_namespaces: Vec<String>,

    /// Keep only these manageable states
    #[arg(short = 'm', long, value_delimiter = ',')]
    include_states: Vec<ManageableState>,

    /// Drop these manageable states
    #[arg(long, value_delimiter = ',')]
    exclude_states: Vec<ManageableState>,
}

#[derive(Args)]
struct PartialArgs {
    /// Focus components, as ids or TYPE:LABEL (e.g. "ApexClass:InvoiceService")
    #[arg(long, required = true, value_delimiter = ',')]
    metadata: Vec<String>,

    /// Write one merged graph instead of one graph per component
    #[arg(long)]
    merge: bool,

    /// Follow references transitively and drop implied edges
    #[arg(long)]
    transitive: bool,
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        let namespaces =
            |values: Vec<String>| non_empty(values.into_iter().map(NamespaceMatch::from).collect());
        Self {
            include_types: non_empty(args.include_types),
            exclude_types: non_empty(args.exclude_types),
            include_namespaces: namespaces(args.include_namespaces),
            exclude_namespaces: namespaces(args.exclude_namespaces),
            include_states: non_empty(args.include_states),
            exclude_states: non_empty(args.exclude_states),
        }
    }
}

fn overrides(output: OutputArgs, filter: Option<FilterArgs>) -> Overrides {
    Overrides {
        output_dir: output.output_dir,
        filter: filter.map(FilterSpec::from).unwrap_or_default(),
        link_fields_to_objects: output.link_fields,
        link_objects_to_triggers: output.link_triggers,
        pretty: output.pretty,
    }
}

fn partial_run(
    config: Option<&Path>,
    input: InputArgs,
    output: OutputArgs,
    filter: FilterArgs,
    partial: &PartialArgs,
    direction: Direction,
    name: &str,
) -> orgmap::Result<()> {
    let session = cli::Session::open(config, input, overrides(output, Some(filter)))?;
    let request = PartialGraphRequest {
        direction,
        merge: partial.merge,
        transitive: partial.transitive,
    };
    cli::partial::run(&session, name, &partial.metadata, &request)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Org { input, output } => {
            cli::Session::open(cli.config.as_deref(), input, overrides(output, None))
                .and_then(|session| cli::map::run(&session.unfiltered(), "org"))
        }
        Commands::Metadata {
            input,
            output,
            filter,
        } => cli::Session::open(cli.config.as_deref(), input, overrides(output, Some(filter)))
            .and_then(|session| cli::map::run(&session, "metadata")),
        Commands::Uses {
            input,
            output,
            filter,
            partial,
        } => partial_run(
            cli.config.as_deref(),
            input,
            output,
            filter,
            &partial,
            Direction::Outgoing,
            "uses",
        ),
        Commands::Dependencies {
            input,
            output,
            filter,
            partial,
        } => partial_run(
            cli.config.as_deref(),
            input,
            output,
            filter,
            &partial,
            Direction::Incoming,
            "dependencies",
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
