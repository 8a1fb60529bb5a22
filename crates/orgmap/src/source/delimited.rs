//! `;`-delimited dependency exports.
//!
//! Each record is one dependency, without a header row:
//!
//! ```text
//! Id;MetadataComponentId;MetadataComponentNamespace;MetadataComponentName;MetadataComponentType;RefMetadataComponentId;RefMetadataComponentNamespace;RefMetadataComponentName;RefMetadataComponentType
//! ```
//!
//! Exports without the leading record id (eight fields) are accepted too.
//! Blank lines are skipped and fields are trimmed.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::EdgeSource;
use crate::error::{Error, Result};
use crate::model::{EdgeRecord, ReferenceEdge};

const FIELDS_WITH_ID: usize = 9;
const FIELDS_WITHOUT_ID: usize = 8;

/// A dependency export on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedEdgeFile {
    path: PathBuf,
}

impl DelimitedEdgeFile {
    /// Refer to the export at `path`. Nothing is read until the edges are loaded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the export.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record of the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened and
    /// [`Error::MalformedInput`] for the first record with the wrong shape.
    pub fn read_records(&self) -> Result<Vec<EdgeRecord>> {
        let file = File::open(&self.path)?;
        parse_records(file, &self.path)
    }
}

impl EdgeSource for DelimitedEdgeFile {
    fn load_edges(&self) -> Result<Vec<ReferenceEdge>> {
        let records = self.read_records()?;
        debug!(
            path = %self.path.display(),
            records = records.len(),
            "dependency export read"
        );
        Ok(records.iter().map(EdgeRecord::to_edge).collect())
    }
}

/// Parse dependency records from `reader`. `source` names the input in errors.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] for a record that has neither eight nor
/// nine fields or lacks a component id, and [`Error::Csv`] if the input is not
/// readable as delimited text.
pub fn parse_records<R: Read>(reader: R, source: &Path) -> Result<Vec<EdgeRecord>> {
    let mut csv = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(index + 1);
        records.push(to_record(&row, source, line)?);
    }
    Ok(records)
}

fn to_record(row: &StringRecord, source: &Path, line: usize) -> Result<EdgeRecord> {
    let (record_id, offset) = match row.len() {
        FIELDS_WITH_ID => (row.get(0).filter(|id| !id.is_empty()), 1),
        FIELDS_WITHOUT_ID => (None, 0),
        n => {
            return Err(Error::malformed(
                source,
                line,
                format!("expected {FIELDS_WITHOUT_ID} or {FIELDS_WITH_ID} fields, found {n}"),
            ));
        }
    };
    let field = |i: usize| row.get(offset + i).unwrap_or_default().to_string();

    let record = EdgeRecord {
        record_id: record_id.map(str::to_string),
        component_id: field(0),
        component_namespace: field(1),
        component_name: field(2),
        component_type: field(3),
        ref_component_id: field(4),
        ref_component_namespace: field(5),
        ref_component_name: field(6),
        ref_component_type: field(7),
    };

    if record.component_id.is_empty() {
        return Err(Error::malformed(source, line, "missing MetadataComponentId"));
    }
    if record.ref_component_id.is_empty() {
        return Err(Error::malformed(source, line, "missing RefMetadataComponentId"));
    }
    Ok(record)
}
