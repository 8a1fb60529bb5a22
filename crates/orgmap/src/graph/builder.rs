//! Assembling the full graph from a catalog and raw reference edges.
//!
//! Building runs in two passes:
//!
//! 1. Every catalog entity that passes the [`FilterSpec`] becomes a node.
//!    Everything else is absent from the graph and cannot be an edge endpoint.
//! 2. Every raw edge whose endpoints are both nodes is added, duplicates
//!    included. Other edges are dropped with a [`Warning::DanglingEdge`].
//!
//! Optional link passes then add structural edges that the dependency export
//! does not contain, but only between nodes that already exist.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Direction, Graph, Node};
use crate::filter::FilterSpec;
use crate::model::{Catalog, EntityDetails, EntityType, ReferenceEdge};
use crate::progress::{NoProgress, Progress, Stage, track};
use crate::warning::{Warning, WarningCollector};

/// Everything that shapes a graph build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildOptions {
    /// Which entities become nodes
    pub filter: FilterSpec,
    /// Add an edge from every custom field to the object that owns it
    pub link_fields_to_objects: bool,
    /// Add an edge from every object to the triggers that reference it
    pub link_objects_to_triggers: bool,
}

impl BuildOptions {
    /// Options with the given filter and no link passes.
    #[must_use]
    pub fn with_filter(filter: FilterSpec) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// Builds [`Graph`]s from a catalog and an edge list.
pub struct GraphBuilder<'a> {
    options: BuildOptions,
    progress: &'a dyn Progress,
    warnings: WarningCollector,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder with the given options.
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            progress: &NoProgress,
            warnings: WarningCollector::new(),
        }
    }

    /// Report stages to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Record warnings into an existing collector.
    #[must_use]
    pub fn with_warnings(mut self, warnings: WarningCollector) -> Self {
        self.warnings = warnings;
        self
    }

    /// The collector warnings are recorded into.
    #[must_use]
    pub fn warnings(&self) -> &WarningCollector {
        &self.warnings
    }

    /// Build the graph. Never fails: bad edges become warnings.
    #[must_use]
    pub fn build(&self, catalog: &Catalog, edges: &[ReferenceEdge]) -> Graph {
        track(self.progress, Stage::BuildingGraph, || {
            let mut graph = Graph::new();
            self.add_nodes(&mut graph, catalog);
            self.add_edges(&mut graph, edges);

            if self.options.link_fields_to_objects {
                link_fields_to_objects(&mut graph);
            }
            if self.options.link_objects_to_triggers {
                link_objects_to_triggers(&mut graph);
            }

            debug!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "graph built"
            );
            graph
        })
    }

    fn add_nodes(&self, graph: &mut Graph, catalog: &Catalog) {
        let mut filtered_out = 0usize;
        for entity in catalog.iter() {
            if !self.options.filter.accepts(entity) {
                filtered_out += 1;
                continue;
            }
            if !graph.insert_node(Node::new(entity.clone())) {
                self.warnings.add(Warning::DuplicateEntity {
                    id: entity.id.to_string(),
                });
            }
        }
        debug!(
            kept = graph.node_count(),
            filtered_out, "catalog entities filtered"
        );
    }

    fn add_edges(&self, graph: &mut Graph, edges: &[ReferenceEdge]) {
        for edge in edges {
            let source = edge.source_id.as_str();
            let target = edge.target_id.as_str();
            if graph.insert_edge(source, target) {
                continue;
            }
            let missing = [source, target]
                .into_iter()
                .filter(|id| !graph.contains(id))
                .map(str::to_string)
                .collect();
            self.warnings.add(Warning::DanglingEdge {
                source_id: source.to_string(),
                target_id: target.to_string(),
                missing,
            });
        }
    }
}

/// Build a graph with default options apart from `filter`.
///
/// Returns the graph together with the warnings raised while building it.
#[must_use]
pub fn build(
    catalog: &Catalog,
    edges: &[ReferenceEdge],
    filter: &FilterSpec,
) -> (Graph, Vec<Warning>) {
    let builder = GraphBuilder::new(BuildOptions::with_filter(filter.clone()));
    let graph = builder.build(catalog, edges);
    (graph, builder.warnings.into_warnings())
}

fn is_object(entity_type: EntityType) -> bool {
    matches!(
        entity_type,
        EntityType::CustomObject | EntityType::StandardEntity
    )
}

/// Edge from each custom field to its owning object, when both are nodes.
fn link_fields_to_objects(graph: &mut Graph) {
    let links: Vec<(String, String)> = graph
        .nodes()
        .filter_map(|node| match &node.entity().details {
            EntityDetails::CustomField(field) => {
                Some((node.id().to_string(), field.table_enum_or_id.clone()))
            }
            _ => None,
        })
        .filter(|(field, table)| {
            graph
                .node(table)
                .is_some_and(|t| is_object(t.entity_type()))
                && !graph.has_edge(field, table)
        })
        .collect();

    debug!(count = links.len(), "linking custom fields to objects");
    for (field, table) in links {
        graph.insert_edge(&field, &table);
    }
}

/// Reverse edge from each object a trigger references back to the trigger.
fn link_objects_to_triggers(graph: &mut Graph) {
    let links: Vec<(String, String)> = graph
        .nodes()
        .filter(|node| node.entity_type() == EntityType::ApexTrigger)
        .flat_map(|trigger| {
            graph
                .neighbors(trigger.id().as_str(), Direction::Outgoing)
                .into_iter()
                .filter(|object| {
                    graph
                        .node(object.as_str())
                        .is_some_and(|n| is_object(n.entity_type()))
                })
                .map(|object| (object.to_string(), trigger.id().to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|(object, trigger)| !graph.has_edge(object, trigger))
        .collect();

    debug!(count = links.len(), "linking objects to triggers");
    for (object, trigger) in links {
        graph.insert_edge(&object, &trigger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomFieldAttributes, Entity};

    fn catalog() -> Catalog {
        Catalog::from_entities(vec![
            Entity::new("A", "A", EntityType::ApexClass),
            Entity::new("B", "B", EntityType::ApexClass),
            Entity::new("C", "C", EntityType::CustomObject),
        ])
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<ReferenceEdge> {
        pairs.iter().map(|(s, t)| ReferenceEdge::new(*s, *t)).collect()
    }

    #[test]
    fn unfiltered_build_keeps_everything() {
        let (graph, warnings) = build(
            &catalog(),
            &edges(&[("A", "B"), ("B", "C"), ("A", "C")]),
            &FilterSpec::default(),
        );
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn filtered_endpoints_drop_edges_with_warning() {
        let (graph, warnings) = build(
            &catalog(),
            &edges(&[("A", "B"), ("B", "C"), ("A", "C")]),
            &FilterSpec::include_types([EntityType::ApexClass]),
        );

        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains("C"));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge("A", "B"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.kind() == "dangling_edge"));
    }

    #[test]
    fn dangling_warning_lists_both_missing_endpoints() {
        let (_, warnings) = build(&catalog(), &edges(&[("X", "Y")]), &FilterSpec::default());
        assert_eq!(
            warnings,
            [Warning::DanglingEdge {
                source_id: "X".to_string(),
                target_id: "Y".to_string(),
                missing: vec!["X".to_string(), "Y".to_string()],
            }]
        );
    }

    #[test]
    fn duplicate_edges_are_preserved() {
        let (graph, warnings) = build(
            &catalog(),
            &edges(&[("A", "B"), ("A", "B")]),
            &FilterSpec::default(),
        );
        assert_eq!(graph.edge_count(), 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn duplicate_entity_ids_keep_first() {
        let catalog = Catalog::from_entities(vec![
            Entity::new("A", "first", EntityType::ApexClass),
            Entity::new("A", "second", EntityType::ApexTrigger),
        ]);
        let (graph, warnings) = build(&catalog, &[], &FilterSpec::default());

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("A").map(|n| n.label()), Some("first"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), "duplicate_entity");
    }

    #[test]
    fn link_fields_adds_edge_to_existing_object() {
        let field = Entity::with_details(
            "00N1",
            "Invoice__c.Total__c",
            EntityDetails::CustomField(CustomFieldAttributes {
                table_enum_or_id: "01I1".to_string(),
                ..CustomFieldAttributes::default()
            }),
        );
        let orphan = Entity::with_details(
            "00N2",
            "Gone__c.Total__c",
            EntityDetails::CustomField(CustomFieldAttributes {
                table_enum_or_id: "01I9".to_string(),
                ..CustomFieldAttributes::default()
            }),
        );
        let catalog = Catalog::from_entities(vec![
            field,
            orphan,
            Entity::new("01I1", "Invoice__c", EntityType::CustomObject),
        ]);
        let options = BuildOptions {
            link_fields_to_objects: true,
            ..BuildOptions::default()
        };

        let graph = GraphBuilder::new(options).build(&catalog, &[]);
        assert!(graph.has_edge("00N1", "01I1"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn link_triggers_adds_reverse_edge_from_object() {
        let catalog = Catalog::from_entities(vec![
            Entity::new("01q1", "InvoiceTrigger", EntityType::ApexTrigger),
            Entity::new("01I1", "Invoice__c", EntityType::CustomObject),
            Entity::new("01p1", "InvoiceService", EntityType::ApexClass),
        ]);
        let options = BuildOptions {
            link_objects_to_triggers: true,
            ..BuildOptions::default()
        };

        let graph = GraphBuilder::new(options)
            .build(&catalog, &edges(&[("01q1", "01I1"), ("01q1", "01p1")]));
        assert!(graph.has_edge("01I1", "01q1"));
        assert!(!graph.has_edge("01p1", "01q1"));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn shared_collector_receives_warnings() {
        let collector = WarningCollector::new();
        let builder =
            GraphBuilder::new(BuildOptions::default()).with_warnings(collector.clone());
        let _ = builder.build(&catalog(), &edges(&[("A", "Z")]));

        assert_eq!(collector.count_kind("dangling_edge"), 1);
    }
}
