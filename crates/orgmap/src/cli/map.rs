//! `orgmap org` and `orgmap metadata` command implementation.

use orgmap::progress::{Stage, track};

use super::display::{print_warning_summary, print_written};
use super::{Loaded, LogProgress, Session};

/// Build the full graph and write it to `<name>.json`.
pub fn run(session: &Session, name: &str) -> orgmap::Result<()> {
    let progress = LogProgress;
    let Loaded {
        graph,
        packages,
        warnings,
    } = session.build_graph(&progress)?;

    let path = track(&progress, Stage::Writing, || {
        session.writer(packages).write_full(name, &graph)
    })?;

    print_written(&[path], std::slice::from_ref(&graph));
    print_warning_summary(&warnings);
    Ok(())
}
