//! Common display utilities for CLI commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use orgmap::ResolutionError;
use orgmap::graph::Graph;
use orgmap::warning::Warning;

const MAX_DISPLAY_ITEMS: usize = 10;

/// One line per written file, with node and edge counts.
pub fn print_written(paths: &[PathBuf], graphs: &[Graph]) {
    for (path, graph) in paths.iter().zip(graphs) {
        println!(
            "{} {} ({} nodes, {} edges)",
            "Wrote".green().bold(),
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
    }
}

/// Warning counts by kind, followed by the first few warnings.
pub fn print_warning_summary(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }

    // Sort kinds for deterministic output
    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for warning in warnings {
        *by_kind.entry(warning.kind()).or_default() += 1;
    }
    let counts: Vec<String> = by_kind
        .iter()
        .map(|(kind, count)| format!("{count} {kind}"))
        .collect();

    eprintln!(
        "{}: {} warning(s): {}",
        "warning".yellow().bold(),
        warnings.len(),
        counts.join(", ")
    );
    for warning in warnings.iter().take(MAX_DISPLAY_ITEMS) {
        eprintln!("    {} {}", "•".dimmed(), warning.description());
    }
    if warnings.len() > MAX_DISPLAY_ITEMS {
        eprintln!(
            "    {} ... and {} more",
            "•".dimmed(),
            warnings.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Every failed reference on its own line.
pub fn print_resolution_errors(failures: &[ResolutionError]) {
    for failure in failures {
        let label = if failure.is_not_found() {
            "not found".red()
        } else {
            "ambiguous".yellow()
        };
        eprintln!("  {} {label}: {failure}", "•".dimmed());
    }
}
