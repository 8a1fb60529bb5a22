//! Entity catalogs and package membership stored as JSON Lines.
//!
//! One entity per line, type tag and attributes flattened into the object:
//!
//! ```text
//! {"id":"01p000000000001","label":"AccountService","type":"ApexClass","isTest":false,"namespacePrefix":""}
//! ```
//!
//! Package membership files hold one [`PackageMember`] per line.
//!
//! Loading is resilient: a line that does not parse (bad JSON, unknown type,
//! wrong attribute shape) is skipped with a warning
//! ([`Warning::MalformedCatalogLine`] or [`Warning::MalformedPackageLine`])
//! and the rest of the file still loads.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{CatalogSource, PackageSource};
use crate::error::Result;
use crate::model::{Catalog, Entity, PackageMember, PackageMembership};
use crate::warning::{Warning, WarningCollector};

/// A JSONL catalog on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonlCatalogFile {
    path: PathBuf,
}

impl JsonlCatalogFile {
    /// Refer to the catalog at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonlCatalogFile {
    fn load_catalog(&self, warnings: &WarningCollector) -> Result<Catalog> {
        let file = File::open(&self.path)?;
        let catalog = parse_catalog(BufReader::new(file), warnings)?;
        debug!(
            path = %self.path.display(),
            entities = catalog.len(),
            "catalog read"
        );
        Ok(catalog)
    }
}

/// A JSONL package membership file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonlPackageFile {
    path: PathBuf,
}

impl JsonlPackageFile {
    /// Refer to the membership file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the membership file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageSource for JsonlPackageFile {
    fn load_packages(&self, warnings: &WarningCollector) -> Result<PackageMembership> {
        let file = File::open(&self.path)?;
        let membership = parse_packages(BufReader::new(file), warnings)?;
        debug!(
            path = %self.path.display(),
            components = membership.len(),
            "package membership read"
        );
        Ok(membership)
    }
}

/// Parse a catalog from JSON Lines, skipping blank and malformed lines.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) only if reading fails.
pub fn parse_catalog<R: BufRead>(reader: R, warnings: &WarningCollector) -> Result<Catalog> {
    let entities = parse_lines::<Entity, _>(reader, warnings, |line_number, error| {
        Warning::MalformedCatalogLine { line_number, error }
    })?;
    Ok(Catalog::from_entities(entities))
}

/// Parse package membership from JSON Lines, skipping blank and malformed lines.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) only if reading fails.
pub fn parse_packages<R: BufRead>(
    reader: R,
    warnings: &WarningCollector,
) -> Result<PackageMembership> {
    let members = parse_lines::<PackageMember, _>(reader, warnings, |line_number, error| {
        Warning::MalformedPackageLine { line_number, error }
    })?;
    Ok(PackageMembership::from_members(members))
}

fn parse_lines<T, R>(
    reader: R,
    warnings: &WarningCollector,
    malformed: impl Fn(usize, String) -> Warning,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut items = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(item) => items.push(item),
            Err(e) => warnings.add(malformed(index + 1, e.to_string())),
        }
    }
    Ok(items)
}
