//! JSON node-link documents.
//!
//! A [`GraphDocument`] carries everything a graph exposes: per node the id,
//! label, type tag, the two partial-graph flags and the type-specific
//! attributes, plus the package when package info is included; per edge the
//! two endpoint ids. Node and edge order follow the graph's own iteration
//! order.
//!
//! ```text
//! {
//!   "name": "uses-0",
//!   "directed": true,
//!   "nodes": [{"id": "01p1", "label": "A", "type": "ApexClass",
//!              "isSuccessor": false, "isPredecessor": false, "attributes": {...}}],
//!   "edges": [{"source": "01p1", "target": "01p2"}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::graph::{Graph, Node};
use crate::model::{EntityId, EntityType, PackageInfo, PackageMembership};

/// One node of a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntry {
    /// Node id
    pub id: EntityId,
    /// Display label
    pub label: String,
    /// Type tag
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Reached by following outgoing edges from a focus
    pub is_successor: bool,
    /// Reached by following incoming edges to a focus
    pub is_predecessor: bool,
    /// Type-specific attributes
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Package the component belongs to, when package info is included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageInfo>,
}

impl From<&Node> for NodeEntry {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().clone(),
            label: node.label().to_string(),
            entity_type: node.entity_type(),
            is_successor: node.is_successor(),
            is_predecessor: node.is_predecessor(),
            attributes: node.entity().attributes(),
            package: None,
        }
    }
}

/// One edge of a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEntry {
    /// Referencing node id
    pub source: EntityId,
    /// Referenced node id
    pub target: EntityId,
}

/// Serializable snapshot of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Document name, also the file stem
    pub name: String,
    /// Always `true`
    pub directed: bool,
    /// Nodes in graph order
    pub nodes: Vec<NodeEntry>,
    /// Edges in graph order, parallel edges included
    pub edges: Vec<EdgeEntry>,
}

impl GraphDocument {
    /// Snapshot `graph` under `name`.
    #[must_use]
    pub fn from_graph(name: impl Into<String>, graph: &Graph) -> Self {
        Self {
            name: name.into(),
            directed: true,
            nodes: graph.nodes().map(NodeEntry::from).collect(),
            edges: graph
                .edges()
                .map(|e| EdgeEntry {
                    source: e.source.clone(),
                    target: e.target.clone(),
                })
                .collect(),
        }
    }

    /// Attach the package of every packaged node.
    #[must_use]
    pub fn with_packages(mut self, packages: &PackageMembership) -> Self {
        for node in &mut self.nodes {
            node.package = packages.get(node.id.as_str()).cloned();
        }
        self
    }
}

/// Writes graph documents into an output directory.
#[derive(Debug, Clone)]
pub struct GraphWriter {
    output_dir: PathBuf,
    pretty: bool,
    packages: Option<PackageMembership>,
}

impl GraphWriter {
    /// Write into `output_dir`, creating it on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pretty: false,
            packages: None,
        }
    }

    /// Include package info on every packaged node.
    #[must_use]
    pub fn packages(mut self, packages: PackageMembership) -> Self {
        self.packages = Some(packages);
        self
    }

    /// Indent the JSON output.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Directory documents are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a full graph to `<name>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_full(&self, name: &str, graph: &Graph) -> Result<PathBuf> {
        self.write(&self.document(name.to_string(), graph))
    }

    /// Write partial graphs to `<name>-0.json`, `<name>-1.json` and so on.
    ///
    /// # Errors
    ///
    /// Returns an error on the first document that cannot be written.
    pub fn write_partials(&self, name: &str, graphs: &[Graph]) -> Result<Vec<PathBuf>> {
        graphs
            .iter()
            .enumerate()
            .map(|(index, graph)| self.write(&self.document(format!("{name}-{index}"), graph)))
            .collect()
    }

    fn document(&self, name: String, graph: &Graph) -> GraphDocument {
        let document = GraphDocument::from_graph(name, graph);
        match &self.packages {
            Some(packages) => document.with_packages(packages),
            None => document,
        }
    }

    fn write(&self, document: &GraphDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.json", document.name));

        let mut writer = BufWriter::new(File::create(&path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, document)?;
        } else {
            serde_json::to_writer(&mut writer, document)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!(
            path = %path.display(),
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "graph written"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterSpec;
    use crate::graph::{Direction, build, extract_neighborhood};
    use crate::model::{Catalog, Entity, PackageMember, ReferenceEdge};
    use tempfile::TempDir;

    fn graph() -> Graph {
        let catalog = Catalog::from_entities(vec![
            Entity::new("01p1", "A", EntityType::ApexClass).in_namespace(Some("acme")),
            Entity::new("01p2", "B", EntityType::ApexClass),
        ]);
        build(
            &catalog,
            &[ReferenceEdge::new("01p1", "01p2")],
            &FilterSpec::default(),
        )
        .0
    }

    #[test]
    fn document_carries_the_output_contract() {
        let document = GraphDocument::from_graph("org", &graph());
        let json = serde_json::to_value(&document).expect("serializable");

        let node = &json["nodes"][0];
        assert_eq!(node["id"], "01p1");
        assert_eq!(node["label"], "A");
        assert_eq!(node["type"], "ApexClass");
        assert_eq!(node["isSuccessor"], false);
        assert_eq!(node["isPredecessor"], false);
        assert_eq!(node["attributes"]["namespacePrefix"], "acme");
        assert!(node["attributes"].get("type").is_none());
        assert_eq!(json["edges"][0]["source"], "01p1");
        assert_eq!(json["edges"][0]["target"], "01p2");
    }

    #[test]
    fn partials_are_numbered_from_zero() {
        let dir = TempDir::new().expect("temp dir");
        let full = graph();
        let partials = extract_neighborhood(
            &full,
            &[EntityId::from("01p1"), EntityId::from("01p2")],
            Direction::Outgoing,
            false,
        )
        .expect("focus exists");

        let writer = GraphWriter::new(dir.path().join("out"));
        let paths = writer.write_partials("uses", &partials).expect("writable");

        assert_eq!(
            paths,
            [
                dir.path().join("out").join("uses-0.json"),
                dir.path().join("out").join("uses-1.json")
            ]
        );
        let text = fs::read_to_string(&paths[0]).expect("written");
        let document: GraphDocument = serde_json::from_str(&text).expect("valid json");
        assert_eq!(document.name, "uses-0");
        assert_eq!(document.nodes.len(), 2);
        assert!(document.nodes[1].is_successor);
    }

    #[test]
    fn package_info_is_attached_only_when_requested() {
        let dir = TempDir::new().expect("temp dir");
        let packages = PackageMembership::from_members([PackageMember {
            package_id: "0A31".to_string(),
            package_name: "Billing".to_string(),
            component_id: EntityId::from("01p1"),
        }]);

        let plain = GraphWriter::new(dir.path().join("plain"))
            .write_full("org", &graph())
            .expect("writable");
        let with_packages = GraphWriter::new(dir.path().join("packaged"))
            .packages(packages)
            .write_full("org", &graph())
            .expect("writable");

        let read = |path: &Path| -> serde_json::Value {
            serde_json::from_str(&fs::read_to_string(path).expect("written")).expect("valid json")
        };
        let plain = read(&plain);
        assert!(plain["nodes"][0].get("package").is_none());

        let packaged = read(&with_packages);
        assert_eq!(packaged["nodes"][0]["package"]["id"], "0A31");
        assert_eq!(packaged["nodes"][0]["package"]["name"], "Billing");
        assert!(packaged["nodes"][1].get("package").is_none());

        let document: GraphDocument = serde_json::from_value(packaged).expect("round trips");
        assert_eq!(
            document.nodes[0].package,
            Some(PackageInfo {
                id: "0A31".to_string(),
                name: "Billing".to_string()
            })
        );
    }

    #[test]
    fn pretty_output_is_indented() {
        let dir = TempDir::new().expect("temp dir");
        let path = GraphWriter::new(dir.path())
            .pretty(true)
            .write_full("org", &graph())
            .expect("writable");

        let text = fs::read_to_string(path).expect("written");
        assert!(text.contains("\n  \"name\": \"org\""));
    }
}
