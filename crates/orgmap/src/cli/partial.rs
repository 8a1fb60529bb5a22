//! `orgmap uses` and `orgmap dependencies` command implementation.

use orgmap::Error;
use orgmap::graph::{self, PartialGraphRequest};
use orgmap::progress::{Stage, track};

use super::display::{print_resolution_errors, print_warning_summary, print_written};
use super::{Loaded, LogProgress, Session};

/// Build the full graph, extract partial graphs around `references` and write
/// them to `<name>-<index>.json`.
///
/// Every reference must resolve; otherwise each failure is printed and
/// nothing is written.
pub fn run(
    session: &Session,
    name: &str,
    references: &[String],
    request: &PartialGraphRequest,
) -> orgmap::Result<()> {
    if request.transitive && references.len() != 1 {
        return Err(Error::Config(format!(
            "--transitive takes exactly one --metadata reference, got {}",
            references.len()
        )));
    }

    let progress = LogProgress;
    let Loaded {
        graph: full,
        packages,
        warnings,
    } = session.build_graph(&progress)?;

    let focus = match graph::resolve_all(&full, references) {
        Ok(ids) => ids,
        Err(Error::Resolution(failures)) => {
            print_resolution_errors(&failures);
            return Err(Error::Resolution(failures));
        }
        Err(e) => return Err(e),
    };

    let partials = track(&progress, Stage::Extracting, || {
        graph::partial::extract(&full, &focus, request)
    })?;
    let paths = track(&progress, Stage::Writing, || {
        session.writer(packages).write_partials(name, &partials)
    })?;

    print_written(&paths, &partials);
    print_warning_summary(&warnings);
    Ok(())
}
