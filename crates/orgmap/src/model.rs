//! Domain types for org metadata components and their references.
//!
//! Entities are the components of an org (classes, triggers, fields, objects).
//! Every entity carries the attributes of its own type in an [`EntityDetails`]
//! variant, so no code ever probes for a field another type might not have.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier of an entity, unique across all types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create a new entity ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Metadata type of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    /// Apex class
    ApexClass,
    /// Apex trigger
    ApexTrigger,
    /// Custom field on an object
    CustomField,
    /// Standard object shipped with the platform
    StandardEntity,
    /// Custom object
    CustomObject,
    /// A component whose type the catalog does not model
    Unknown,
}

impl EntityType {
    /// Every type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ApexClass,
        Self::ApexTrigger,
        Self::CustomField,
        Self::StandardEntity,
        Self::CustomObject,
        Self::Unknown,
    ];

    /// The type name as written in node references and exports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApexClass => "ApexClass",
            Self::ApexTrigger => "ApexTrigger",
            Self::CustomField => "CustomField",
            Self::StandardEntity => "StandardEntity",
            Self::CustomObject => "CustomObject",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown metadata type '{s}'"))
    }
}

/// Packaging lifecycle state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManageableState {
    /// Part of a beta package version
    Beta,
    /// Deleted from a package
    Deleted,
    /// Deprecated in a package
    Deprecated,
    /// Deprecated but still editable
    DeprecatedEditable,
    /// Installed from a managed package
    Installed,
    /// Installed and editable by subscribers
    InstalledEditable,
    /// Part of a released package version
    Released,
    /// Not part of any managed package
    Unmanaged,
    /// Standard platform object
    StandardEntity,
}

impl ManageableState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Beta,
        Self::Deleted,
        Self::Deprecated,
        Self::DeprecatedEditable,
        Self::Installed,
        Self::InstalledEditable,
        Self::Released,
        Self::Unmanaged,
        Self::StandardEntity,
    ];

    /// The state name as it appears in metadata queries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Deleted => "deleted",
            Self::Deprecated => "deprecated",
            Self::DeprecatedEditable => "deprecatedEditable",
            Self::Installed => "installed",
            Self::InstalledEditable => "installedEditable",
            Self::Released => "released",
            Self::Unmanaged => "unmanaged",
            Self::StandardEntity => "standardEntity",
        }
    }
}

impl fmt::Display for ManageableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManageableState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown manageable state '{s}'"))
    }
}

/// Activation status of Apex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Active
    Active,
    /// Deleted
    Deleted,
    /// Inactive
    Inactive,
}

/// Treat an empty namespace prefix as "no namespace".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Attributes of an Apex class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApexClassAttributes {
    /// API version the class is saved against
    pub api_version: Option<f64>,
    /// Whether the class is annotated as a test class
    pub is_test: bool,
    /// Whether the compiled class is valid
    pub is_valid: bool,
    /// Source length without comments
    pub length_without_comments: u64,
    /// Packaging state
    pub manageable_state: Option<ManageableState>,
    /// Activation status
    pub status: Option<Status>,
    /// Namespace prefix, `None` when the class has no namespace
    #[serde(deserialize_with = "empty_as_none")]
    pub namespace_prefix: Option<String>,
}

/// Attributes of an Apex trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApexTriggerAttributes {
    /// API version the trigger is saved against
    pub api_version: Option<f64>,
    /// Whether the compiled trigger is valid
    pub is_valid: bool,
    /// Source length without comments
    pub length_without_comments: u64,
    /// Packaging state
    pub manageable_state: Option<ManageableState>,
    /// Activation status
    pub status: Option<Status>,
    /// Namespace prefix
    #[serde(deserialize_with = "empty_as_none")]
    pub namespace_prefix: Option<String>,
}

/// Attributes of a custom field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFieldAttributes {
    /// Qualified developer name (`Object.Field__c`)
    pub developer_name: String,
    /// Id or enum name of the object the field belongs to
    pub table_enum_or_id: String,
    /// API name of the owning object
    pub entity_definition_name: Option<String>,
    /// Packaging state
    pub manageable_state: Option<ManageableState>,
    /// Namespace prefix
    #[serde(deserialize_with = "empty_as_none")]
    pub namespace_prefix: Option<String>,
}

/// Attributes of a standard object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardEntityAttributes {
    /// Qualified API name
    pub qualified_api_name: String,
    /// Packaging state, always `standardEntity` unless the record says otherwise
    pub manageable_state: Option<ManageableState>,
    /// Namespace prefix
    #[serde(deserialize_with = "empty_as_none")]
    pub namespace_prefix: Option<String>,
}

impl Default for StandardEntityAttributes {
    fn default() -> Self {
        Self {
            qualified_api_name: String::new(),
            manageable_state: Some(ManageableState::StandardEntity),
            namespace_prefix: None,
        }
    }
}

/// Attributes of a custom object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomObjectAttributes {
    /// Developer name
    pub developer_name: String,
    /// Packaging state
    pub manageable_state: Option<ManageableState>,
    /// Namespace prefix
    #[serde(deserialize_with = "empty_as_none")]
    pub namespace_prefix: Option<String>,
}

/// Type-specific payload of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityDetails {
    /// Apex class attributes
    ApexClass(ApexClassAttributes),
    /// Apex trigger attributes
    ApexTrigger(ApexTriggerAttributes),
    /// Custom field attributes
    CustomField(CustomFieldAttributes),
    /// Standard object attributes
    StandardEntity(StandardEntityAttributes),
    /// Custom object attributes
    CustomObject(CustomObjectAttributes),
    /// No known attributes
    Unknown,
}

impl EntityDetails {
    /// Default attributes for an entity of the given type.
    #[must_use]
    pub fn empty(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::ApexClass => Self::ApexClass(ApexClassAttributes::default()),
            EntityType::ApexTrigger => Self::ApexTrigger(ApexTriggerAttributes::default()),
            EntityType::CustomField => Self::CustomField(CustomFieldAttributes::default()),
            EntityType::StandardEntity => {
                Self::StandardEntity(StandardEntityAttributes::default())
            }
            EntityType::CustomObject => Self::CustomObject(CustomObjectAttributes::default()),
            EntityType::Unknown => Self::Unknown,
        }
    }

    /// The type tag of this payload.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::ApexClass(_) => EntityType::ApexClass,
            Self::ApexTrigger(_) => EntityType::ApexTrigger,
            Self::CustomField(_) => EntityType::CustomField,
            Self::StandardEntity(_) => EntityType::StandardEntity,
            Self::CustomObject(_) => EntityType::CustomObject,
            Self::Unknown => EntityType::Unknown,
        }
    }

    fn namespace_slot(&mut self) -> Option<&mut Option<String>> {
        match self {
            Self::ApexClass(a) => Some(&mut a.namespace_prefix),
            Self::ApexTrigger(a) => Some(&mut a.namespace_prefix),
            Self::CustomField(a) => Some(&mut a.namespace_prefix),
            Self::StandardEntity(a) => Some(&mut a.namespace_prefix),
            Self::CustomObject(a) => Some(&mut a.namespace_prefix),
            Self::Unknown => None,
        }
    }

    fn state_slot(&mut self) -> Option<&mut Option<ManageableState>> {
        match self {
            Self::ApexClass(a) => Some(&mut a.manageable_state),
            Self::ApexTrigger(a) => Some(&mut a.manageable_state),
            Self::CustomField(a) => Some(&mut a.manageable_state),
            Self::StandardEntity(a) => Some(&mut a.manageable_state),
            Self::CustomObject(a) => Some(&mut a.manageable_state),
            Self::Unknown => None,
        }
    }
}

/// A uniquely identified, typed component of the org.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Globally unique id
    pub id: EntityId,
    /// Display label
    pub label: String,
    /// Type tag and type-specific attributes
    #[serde(flatten)]
    pub details: EntityDetails,
}

impl Entity {
    /// Create an entity with default attributes for `entity_type`.
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>, entity_type: EntityType) -> Self {
        Self::with_details(id, label, EntityDetails::empty(entity_type))
    }

    /// Create an entity from an explicit payload.
    pub fn with_details(
        id: impl Into<EntityId>,
        label: impl Into<String>,
        details: EntityDetails,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            details,
        }
    }

    /// Set the namespace prefix. Has no effect on `Unknown` entities.
    #[must_use]
    pub fn in_namespace(mut self, namespace: Option<&str>) -> Self {
        if let Some(slot) = self.details.namespace_slot() {
            *slot = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        }
        self
    }

    /// Set the manageable state. Has no effect on `Unknown` entities.
    #[must_use]
    pub fn in_state(mut self, state: ManageableState) -> Self {
        if let Some(slot) = self.details.state_slot() {
            *slot = Some(state);
        }
        self
    }

    /// The entity's type.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.details.entity_type()
    }

    /// Namespace prefix, `None` for entities without a namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match &self.details {
            EntityDetails::ApexClass(a) => a.namespace_prefix.as_deref(),
            EntityDetails::ApexTrigger(a) => a.namespace_prefix.as_deref(),
            EntityDetails::CustomField(a) => a.namespace_prefix.as_deref(),
            EntityDetails::StandardEntity(a) => a.namespace_prefix.as_deref(),
            EntityDetails::CustomObject(a) => a.namespace_prefix.as_deref(),
            EntityDetails::Unknown => None,
        }
    }

    /// Packaging state, if the type has one.
    #[must_use]
    pub fn manageable_state(&self) -> Option<ManageableState> {
        match &self.details {
            EntityDetails::ApexClass(a) => a.manageable_state,
            EntityDetails::ApexTrigger(a) => a.manageable_state,
            EntityDetails::CustomField(a) => a.manageable_state,
            EntityDetails::StandardEntity(a) => a.manageable_state,
            EntityDetails::CustomObject(a) => a.manageable_state,
            EntityDetails::Unknown => None,
        }
    }

    /// Whether this is an Apex test class.
    #[must_use]
    pub fn is_test(&self) -> bool {
        matches!(&self.details, EntityDetails::ApexClass(a) if a.is_test)
    }

    /// The type-specific attributes as a flat map, without the type tag.
    #[must_use]
    pub fn attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(&self.details) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("type");
                map
            }
            _ => serde_json::Map::new(),
        }
    }
}

/// The immutable set of entities fetched in one cycle.
///
/// Iteration follows insertion order, which is also the node order of any
/// graph built from the catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    /// Wrap a list of entities.
    #[must_use]
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Iterate entities in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterate entities of one type.
    pub fn of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type() == entity_type)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for Catalog {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::from_entities(iter.into_iter().collect())
    }
}

/// A package components are installed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Subscriber package id
    pub id: String,
    /// Package name
    pub name: String,
}

/// One package membership record: `component_id` belongs to the package.
///
/// ```text
/// {"packageId":"0A31","packageName":"Billing","componentId":"01p1"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMember {
    /// Subscriber package id
    pub package_id: String,
    /// Package name
    pub package_name: String,
    /// Member component id
    pub component_id: EntityId,
}

/// The package of each packaged component.
///
/// A component listed under several packages keeps the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMembership {
    by_component: HashMap<EntityId, PackageInfo>,
}

impl PackageMembership {
    /// Index membership records, in order.
    #[must_use]
    pub fn from_members(members: impl IntoIterator<Item = PackageMember>) -> Self {
        let mut by_component = HashMap::new();
        for member in members {
            by_component
                .entry(member.component_id)
                .or_insert(PackageInfo {
                    id: member.package_id,
                    name: member.package_name,
                });
        }
        Self { by_component }
    }

    /// Package of the component `id`, if it is packaged.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PackageInfo> {
        self.by_component.get(id)
    }

    /// Number of packaged components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_component.len()
    }

    /// Whether no component is packaged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_component.is_empty()
    }
}

/// A directed reference: `source_id` references `target_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceEdge {
    /// Referencing component
    pub source_id: EntityId,
    /// Referenced component
    pub target_id: EntityId,
}

impl ReferenceEdge {
    /// Create a new edge
    pub fn new(source_id: impl Into<EntityId>, target_id: impl Into<EntityId>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// One dependency record as exported by the org.
///
/// Only the two ids take part in graph building; the other columns are
/// informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Id of the dependency record itself, when the export carries one
    pub record_id: Option<String>,
    /// Referencing component id
    pub component_id: String,
    /// Referencing component namespace
    pub component_namespace: String,
    /// Referencing component name
    pub component_name: String,
    /// Referencing component type
    pub component_type: String,
    /// Referenced component id
    pub ref_component_id: String,
    /// Referenced component namespace
    pub ref_component_namespace: String,
    /// Referenced component name
    pub ref_component_name: String,
    /// Referenced component type
    pub ref_component_type: String,
}

impl EdgeRecord {
    /// The graph edge this record describes.
    #[must_use]
    pub fn to_edge(&self) -> ReferenceEdge {
        ReferenceEdge::new(self.component_id.as_str(), self.ref_component_id.as_str())
    }
}
