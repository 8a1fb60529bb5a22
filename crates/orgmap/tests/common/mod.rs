//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use orgmap::filter::FilterSpec;
use orgmap::graph::{self, Graph};
use orgmap::model::{
    Catalog, CustomFieldAttributes, Entity, EntityDetails, EntityType, ManageableState,
    ReferenceEdge,
};

/// A small invoicing org.
///
/// | id      | label                | type           | namespace | state          |
/// |---------|----------------------|----------------|-----------|----------------|
/// | 01p1    | InvoiceService       | ApexClass      | -         | unmanaged      |
/// | 01p2    | TaxCalculator        | ApexClass      | acme      | installed      |
/// | 01q1    | InvoiceTrigger       | ApexTrigger    | -         | unmanaged      |
/// | 01I1    | Invoice__c           | CustomObject   | -         | unmanaged      |
/// | 00N1    | Invoice__c.Total__c  | CustomField    | -         | unmanaged      |
/// | Account | Account              | StandardEntity | -         | standardEntity |
pub fn invoicing_catalog() -> Catalog {
    let total = Entity::with_details(
        "00N1",
        "Invoice__c.Total__c",
        EntityDetails::CustomField(CustomFieldAttributes {
            developer_name: "Total".to_string(),
            table_enum_or_id: "01I1".to_string(),
            ..CustomFieldAttributes::default()
        }),
    );
    Catalog::from_entities(vec![
        Entity::new("01p1", "InvoiceService", EntityType::ApexClass)
            .in_state(ManageableState::Unmanaged),
        Entity::new("01p2", "TaxCalculator", EntityType::ApexClass)
            .in_namespace(Some("acme"))
            .in_state(ManageableState::Installed),
        Entity::new("01q1", "InvoiceTrigger", EntityType::ApexTrigger)
            .in_state(ManageableState::Unmanaged),
        Entity::new("01I1", "Invoice__c", EntityType::CustomObject)
            .in_state(ManageableState::Unmanaged),
        total.in_state(ManageableState::Unmanaged),
        Entity::new("Account", "Account", EntityType::StandardEntity),
    ])
}

/// Dependencies of [`invoicing_catalog`].
pub fn invoicing_edges() -> Vec<ReferenceEdge> {
    edges(&[
        ("01p1", "01p2"),
        ("01q1", "01p1"),
        ("01q1", "01I1"),
        ("01p1", "00N1"),
        ("01p1", "Account"),
    ])
}

/// `A`, `B` (ApexClass) and `C` (CustomObject), labelled by their ids.
pub fn abc_catalog() -> Catalog {
    Catalog::from_entities(vec![
        Entity::new("A", "A", EntityType::ApexClass),
        Entity::new("B", "B", EntityType::ApexClass),
        Entity::new("C", "C", EntityType::CustomObject),
    ])
}

/// Edges from `(source, target)` pairs.
pub fn edges(pairs: &[(&str, &str)]) -> Vec<ReferenceEdge> {
    pairs
        .iter()
        .map(|(s, t)| ReferenceEdge::new(*s, *t))
        .collect()
}

/// Unfiltered graph of `catalog` and `edges`.
pub fn graph_of(catalog: &Catalog, edges: &[ReferenceEdge]) -> Graph {
    graph::build(catalog, edges, &FilterSpec::default()).0
}

/// Node ids in graph order.
pub fn node_ids(graph: &Graph) -> Vec<String> {
    graph.node_ids().map(ToString::to_string).collect()
}

/// Edges as `(source, target)` in graph order.
pub fn edge_pairs(graph: &Graph) -> Vec<(String, String)> {
    graph
        .edges()
        .map(|e| (e.source.to_string(), e.target.to_string()))
        .collect()
}

/// Owned `(source, target)` pairs.
pub fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
        .collect()
}

/// Catalog as JSON Lines.
pub fn catalog_jsonl(catalog: &Catalog) -> String {
    catalog
        .iter()
        .map(|e| serde_json::to_string(e).expect("entity serializes"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Edges as a nine-field `;`-delimited export.
pub fn edges_export(edges: &[ReferenceEdge]) -> String {
    edges
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "0dK{i};{};;Source;ApexClass;{};;Target;ApexClass\n",
                e.source_id, e.target_id
            )
        })
        .collect()
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write test file");
    path
}
