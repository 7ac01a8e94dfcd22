//! Schema type definitions for composite resource synthesis.
//!
//! This module defines the data model shared by every synthesis stage: the
//! recursive [`SchemaNode`] tree, caller-supplied [`FieldSpec`] values, the
//! immutable [`ContractBlock`] tables, and the printer-column metadata emitted
//! alongside a schema. All types serialize with [`serde`] using the OpenAPI v3
//! key names the API server expects.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` keyword of an OpenAPI v3 schema node.
///
/// # Examples
///
/// ```
/// use composite_schema_core::SchemaType;
///
/// assert_eq!(SchemaType::Integer.to_string(), "integer");
/// assert_eq!(serde_json::to_string(&SchemaType::Object).unwrap(), "\"object\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl SchemaType {
    /// Returns the wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `additionalProperties` keyword: either a plain allow/deny flag or a
/// schema every unknown key's value must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` admits any unknown key, `false` rejects all of them.
    Allowed(bool),
    /// Unknown keys are admitted when their value matches this schema.
    Schema(Box<SchemaNode>),
}

impl AdditionalProperties {
    fn shape_eq(&self, other: &AdditionalProperties) -> bool {
        match (self, other) {
            (AdditionalProperties::Allowed(a), AdditionalProperties::Allowed(b)) => a == b,
            (AdditionalProperties::Schema(a), AdditionalProperties::Schema(b)) => a.shape_eq(b),
            _ => false,
        }
    }
}

/// A node of an OpenAPI v3 schema tree.
///
/// Properties and the `required` list are kept in sorted collections so that
/// serialization is canonical (lexicographic key order) and equality does not
/// depend on insertion order. Enum literals keep their declared order.
///
/// Use the constructors ([`object`](SchemaNode::object),
/// [`string`](SchemaNode::string), [`array`](SchemaNode::array), ...) and
/// chain builder methods to assemble trees.
///
/// # Examples
///
/// ```
/// use composite_schema_core::{SchemaNode, SchemaType};
///
/// let secret_ref = SchemaNode::object()
///     .with_required_property("name", SchemaNode::string())
///     .with_property("namespace", SchemaNode::string());
///
/// assert_eq!(secret_ref.schema_type, SchemaType::Object);
/// assert!(secret_ref.required.contains("name"));
/// assert!(!secret_ref.required.contains("namespace"));
/// assert_eq!(secret_ref.type_descriptor(), "object{name, namespace}");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// The `type` keyword.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format hint for scalar values, e.g. `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed literal values, in declared order.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required: BTreeSet<String>,
    /// Element schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl SchemaNode {
    /// Creates a bare node of the given type.
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            format: None,
            enum_values: Vec::new(),
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            items: None,
            additional_properties: None,
        }
    }

    /// Creates an object node with no declared properties.
    pub fn object() -> Self {
        Self::new(SchemaType::Object)
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::new(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaType::Boolean)
    }

    /// Creates an array node whose elements match `items`.
    ///
    /// # Examples
    ///
    /// ```
    /// use composite_schema_core::SchemaNode;
    ///
    /// let tags = SchemaNode::array(SchemaNode::string());
    /// assert_eq!(tags.type_descriptor(), "array<string>");
    /// ```
    pub fn array(items: SchemaNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(SchemaType::Array)
        }
    }

    /// Adds an optional property.
    pub fn with_property(mut self, name: &str, node: SchemaNode) -> Self {
        self.properties.insert(name.to_string(), node);
        self
    }

    /// Adds a property and marks it required.
    pub fn with_required_property(mut self, name: &str, node: SchemaNode) -> Self {
        self.properties.insert(name.to_string(), node);
        self.required.insert(name.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the format hint.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Restricts the node to the given literals, keeping their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use composite_schema_core::SchemaNode;
    ///
    /// let tier = SchemaNode::string().with_enum(["small", "large"]);
    /// assert_eq!(tier.enum_values.len(), 2);
    /// assert_eq!(tier.enum_values[0], "small");
    /// ```
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `additionalProperties` keyword.
    pub fn with_additional_properties(mut self, additional: AdditionalProperties) -> Self {
        self.additional_properties = Some(additional);
        self
    }

    /// Looks up a direct child property.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.get(name)
    }

    /// Returns `true` if this node is an object.
    pub fn is_object(&self) -> bool {
        self.schema_type == SchemaType::Object
    }

    /// Compares two nodes structurally.
    ///
    /// Two nodes have the same shape when their type, format, enum literals,
    /// properties, required set, items and additional properties agree
    /// recursively. Descriptions are annotations and do not take part.
    ///
    /// # Examples
    ///
    /// ```
    /// use composite_schema_core::SchemaNode;
    ///
    /// let a = SchemaNode::integer().with_description("replica count");
    /// let b = SchemaNode::integer();
    /// assert!(a.shape_eq(&b));
    /// assert!(!a.shape_eq(&SchemaNode::string()));
    /// ```
    pub fn shape_eq(&self, other: &SchemaNode) -> bool {
        if self.schema_type != other.schema_type
            || self.format != other.format
            || self.enum_values != other.enum_values
            || self.required != other.required
            || self.properties.len() != other.properties.len()
        {
            return false;
        }

        let items_match = match (&self.items, &other.items) {
            (Some(a), Some(b)) => a.shape_eq(b),
            (None, None) => true,
            _ => false,
        };
        let additional_match = match (&self.additional_properties, &other.additional_properties) {
            (Some(a), Some(b)) => a.shape_eq(b),
            (None, None) => true,
            _ => false,
        };

        items_match
            && additional_match
            && self.properties.iter().all(|(name, node)| {
                other
                    .properties
                    .get(name)
                    .is_some_and(|theirs| node.shape_eq(theirs))
            })
    }

    /// Returns a short human-readable description of this node's shape, used
    /// in error messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use composite_schema_core::SchemaNode;
    ///
    /// let when = SchemaNode::string().with_format("date-time");
    /// assert_eq!(when.type_descriptor(), "string(date-time)");
    ///
    /// let phase = SchemaNode::string().with_enum(["Bound", "Released"]);
    /// assert_eq!(phase.type_descriptor(), "string enum[\"Bound\", \"Released\"]");
    /// ```
    pub fn type_descriptor(&self) -> String {
        let mut out = match (self.schema_type, &self.items) {
            (SchemaType::Array, Some(items)) => format!("array<{}>", items.type_descriptor()),
            (SchemaType::Object, _) if !self.properties.is_empty() => {
                let names: Vec<&str> = self.properties.keys().map(String::as_str).collect();
                format!("object{{{}}}", names.join(", "))
            }
            (SchemaType::Object, _) => match &self.additional_properties {
                Some(AdditionalProperties::Schema(values)) => {
                    format!("map<{}>", values.type_descriptor())
                }
                _ => "object".to_string(),
            },
            (ty, _) => ty.to_string(),
        };

        if let Some(format) = &self.format {
            let _ = write!(out, "({format})");
        }
        if !self.enum_values.is_empty() {
            let literals: Vec<String> = self.enum_values.iter().map(Value::to_string).collect();
            let _ = write!(out, " enum[{}]", literals.join(", "));
        }
        out
    }
}

/// A caller-supplied field for one object level.
///
/// # Examples
///
/// ```
/// use composite_schema_core::{FieldSpec, SchemaNode};
///
/// let region = FieldSpec::required("region", SchemaNode::string());
/// assert!(region.required);
///
/// let size = FieldSpec::optional("storageGB", SchemaNode::integer());
/// assert!(!size.required);
/// assert_eq!(size.name, "storageGB");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Property name, unique within its object level.
    pub name: String,
    /// Schema of the property value.
    pub schema: SchemaNode,
    /// Whether the property must be present.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Creates a required field.
    pub fn required(name: &str, schema: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            schema,
            required: true,
        }
    }

    /// Creates an optional field.
    pub fn optional(name: &str, schema: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            schema,
            required: false,
        }
    }
}

/// The two roles a generated resource type can play.
///
/// # Examples
///
/// ```
/// use composite_schema_core::ResourceRole;
///
/// assert_eq!(ResourceRole::Claim.to_string(), "claim");
/// assert_eq!(ResourceRole::ALL.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceRole {
    /// Cluster-scoped resource composed by the orchestrator.
    CompositeResource,
    /// Namespaced, user-facing request bound to one composite resource.
    Claim,
}

impl ResourceRole {
    /// Every role, in declaration order.
    pub const ALL: [ResourceRole; 2] = [ResourceRole::CompositeResource, ResourceRole::Claim];
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRole::CompositeResource => f.write_str("composite resource"),
            ResourceRole::Claim => f.write_str("claim"),
        }
    }
}

/// The object levels that receive contract and custom fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectLevel {
    Spec,
    Status,
}

impl ObjectLevel {
    /// Every level, in merge order.
    pub const ALL: [ObjectLevel; 2] = [ObjectLevel::Spec, ObjectLevel::Status];

    /// Returns the top-level property name for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectLevel::Spec => "spec",
            ObjectLevel::Status => "status",
        }
    }
}

impl fmt::Display for ObjectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed fields a role requires at one object level.
///
/// Blocks are produced by [`contract`](crate::contract) and never mutated.
/// Fields are kept sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractBlock {
    role: ResourceRole,
    level: ObjectLevel,
    fields: Vec<FieldSpec>,
    required: BTreeSet<String>,
}

impl ContractBlock {
    pub(crate) fn new(role: ResourceRole, level: ObjectLevel, mut fields: Vec<FieldSpec>) -> Self {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        let required = fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.clone())
            .collect();
        Self {
            role,
            level,
            fields,
            required,
        }
    }

    pub fn role(&self) -> ResourceRole {
        self.role
    }

    pub fn level(&self) -> ObjectLevel {
        self.level
    }

    /// Contract fields, sorted by name.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Names the contract requires at this level.
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Finds a contract field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .binary_search_by(|f| f.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.fields[idx])
    }

    /// Returns `true` if `name` is reserved by this block.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Gets all reserved field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// A display column projecting one value of a resource instance.
///
/// # Examples
///
/// ```
/// use composite_schema_core::PrinterColumn;
///
/// let col = PrinterColumn::string("COMPOSITION", ".spec.compositionRef.name");
/// let json = serde_json::to_value(&col).unwrap();
/// assert_eq!(json["jsonPath"], ".spec.compositionRef.name");
/// assert_eq!(json["type"], "string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterColumn {
    /// Column header.
    pub name: String,
    /// Column value type, e.g. `string`.
    #[serde(rename = "type")]
    pub value_type: String,
    /// JSONPath projection evaluated against each instance.
    pub json_path: String,
}

impl PrinterColumn {
    /// Creates a string-valued column.
    pub fn string(name: &str, json_path: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: "string".to_string(),
            json_path: json_path.to_string(),
        }
    }
}

/// A complete resource schema: an object rooted at the five top-level keys
/// with merged `spec` and `status` levels.
///
/// Serializes transparently as its root [`SchemaNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedSchema(SchemaNode);

impl GeneratedSchema {
    pub(crate) fn new(root: SchemaNode) -> Self {
        Self(root)
    }

    /// The root object node.
    pub fn root(&self) -> &SchemaNode {
        &self.0
    }

    /// The merged node for one object level.
    pub fn level(&self, level: ObjectLevel) -> Option<&SchemaNode> {
        self.0.property(level.as_str())
    }

    pub fn spec(&self) -> Option<&SchemaNode> {
        self.level(ObjectLevel::Spec)
    }

    pub fn status(&self) -> Option<&SchemaNode> {
        self.level(ObjectLevel::Status)
    }

    /// Consumes the wrapper, returning the root node.
    pub fn into_inner(self) -> SchemaNode {
        self.0
    }
}

/// Output of [`build_schema`](crate::build_schema): the schema plus the
/// role's default printer columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResource {
    /// Role the schema was generated for.
    pub role: ResourceRole,
    /// The merged schema tree.
    pub schema: GeneratedSchema,
    /// Default printer columns for the role, in display order.
    pub printer_columns: Vec<PrinterColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_eq_ignores_description_and_insertion_order() {
        let a = SchemaNode::object()
            .with_required_property("name", SchemaNode::string())
            .with_property("namespace", SchemaNode::string())
            .with_description("secret location");
        let b = SchemaNode::object()
            .with_property("namespace", SchemaNode::string())
            .with_required_property("name", SchemaNode::string());

        assert!(a.shape_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_shape_eq_detects_nested_difference() {
        let a = SchemaNode::array(SchemaNode::object().with_property("uid", SchemaNode::string()));
        let b = SchemaNode::array(SchemaNode::object().with_property("uid", SchemaNode::integer()));

        assert!(!a.shape_eq(&b));
    }

    #[test]
    fn test_shape_eq_compares_required_sets() {
        let a = SchemaNode::object().with_required_property("name", SchemaNode::string());
        let b = SchemaNode::object().with_property("name", SchemaNode::string());

        assert!(!a.shape_eq(&b));
    }

    #[test]
    fn test_type_descriptor_for_string_map() {
        let labels = SchemaNode::object().with_additional_properties(AdditionalProperties::Schema(
            Box::new(SchemaNode::string()),
        ));

        assert_eq!(labels.type_descriptor(), "map<string>");
    }

    #[test]
    fn test_schema_node_serializes_canonical_keys() {
        let node = SchemaNode::object()
            .with_property("zone", SchemaNode::string())
            .with_required_property("apiVersion", SchemaNode::string());

        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"object","properties":{"apiVersion":{"type":"string"},"zone":{"type":"string"}},"required":["apiVersion"]}"#
        );
    }

    #[test]
    fn test_additional_properties_deserializes_bool_and_schema() {
        let open: SchemaNode =
            serde_json::from_str(r#"{"type":"object","additionalProperties":true}"#).unwrap();
        assert_eq!(
            open.additional_properties,
            Some(AdditionalProperties::Allowed(true))
        );

        let typed: SchemaNode = serde_json::from_str(
            r#"{"type":"object","additionalProperties":{"type":"string"}}"#,
        )
        .unwrap();
        assert_eq!(
            typed.additional_properties,
            Some(AdditionalProperties::Schema(Box::new(SchemaNode::string())))
        );
    }

    #[test]
    fn test_contract_block_sorts_and_finds_fields() {
        let block = ContractBlock::new(
            ResourceRole::Claim,
            ObjectLevel::Status,
            vec![
                FieldSpec::optional("readyResources", SchemaNode::integer()),
                FieldSpec::required("bindingPhase", SchemaNode::string()),
            ],
        );

        assert_eq!(block.field_names(), vec!["bindingPhase", "readyResources"]);
        assert!(block.contains("readyResources"));
        assert!(!block.contains("conditions"));
        assert_eq!(block.required().len(), 1);
    }
}
