//! Structural schema validation.
//!
//! Checks a [`SchemaNode`] tree against the structural rules the API server
//! enforces on resource schemas, catching arrays without item schemas,
//! keywords on the wrong node type, required names without properties, and
//! enum literals of the wrong type before a document leaves this crate.
//!
//! This inspects schema documents only. It never validates instances.
//!
//! # Examples
//!
//! ```
//! use composite_schema_core::*;
//!
//! let ok = SchemaNode::array(SchemaNode::string());
//! assert!(validate_schema(&ok).is_empty());
//!
//! // Invalid: array without items
//! let bad = SchemaNode::new(SchemaType::Array);
//! assert_eq!(
//!     validate_schema(&bad),
//!     vec![SchemaViolation::MissingItems("$".to_string())]
//! );
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::{AdditionalProperties, SchemaNode, SchemaType};

/// Structural problems found in a schema tree.
///
/// Paths use a JSONPath-like notation rooted at `$`, with `[*]` for array
/// items and `{*}` for additional-property values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    /// An array node declares no `items` schema.
    #[error("array at {0} must declare items")]
    MissingItems(String),
    /// A non-array node declares `items`.
    #[error("items declared on non-array node at {0}")]
    UnexpectedItems(String),
    /// A non-object node declares `properties`, `required` or
    /// `additionalProperties`.
    #[error("object keywords declared on non-object node at {0}")]
    UnexpectedObjectKeywords(String),
    /// An object declares properties and an `additionalProperties` schema at
    /// the same time.
    #[error("properties and an additionalProperties schema both declared at {0}")]
    ConflictingAdditionalProperties(String),
    /// A required name has no matching property.
    #[error("required field `{name}` has no property at {path}")]
    RequiredWithoutProperty { path: String, name: String },
    /// An enum literal does not match the node's type.
    #[error("enum literal {literal} does not match type {schema_type} at {path}")]
    EnumTypeMismatch {
        path: String,
        literal: String,
        schema_type: SchemaType,
    },
}

/// Validates a schema tree rooted at `$`.
///
/// Returns every violation found, in depth-first order with properties
/// visited lexicographically.
///
/// # Examples
///
/// ```
/// use composite_schema_core::*;
///
/// let node = SchemaNode::object().with_required_property("name", SchemaNode::string());
/// assert!(validate_schema(&node).is_empty());
///
/// let mut broken = node.clone();
/// broken.required.insert("uid".to_string());
/// let errors = validate_schema(&broken);
/// assert!(errors
///     .iter()
///     .any(|e| matches!(e, SchemaViolation::RequiredWithoutProperty { name, .. } if name == "uid")));
/// ```
pub fn validate_schema(node: &SchemaNode) -> Vec<SchemaViolation> {
    validate_schema_at(node, "$")
}

/// Validates a schema tree, reporting paths relative to `root_path`.
pub fn validate_schema_at(node: &SchemaNode, root_path: &str) -> Vec<SchemaViolation> {
    let mut errors = Vec::new();
    validate_node(node, root_path, &mut errors);
    errors
}

fn validate_node(node: &SchemaNode, path: &str, errors: &mut Vec<SchemaViolation>) {
    match (node.schema_type, &node.items) {
        (SchemaType::Array, None) => errors.push(SchemaViolation::MissingItems(path.to_string())),
        (SchemaType::Array, Some(_)) => {}
        (_, Some(_)) => errors.push(SchemaViolation::UnexpectedItems(path.to_string())),
        (_, None) => {}
    }

    if node.is_object() {
        validate_object(node, path, errors);
    } else if !node.properties.is_empty()
        || !node.required.is_empty()
        || node.additional_properties.is_some()
    {
        errors.push(SchemaViolation::UnexpectedObjectKeywords(path.to_string()));
    }

    for literal in &node.enum_values {
        if !literal_matches(literal, node.schema_type) {
            errors.push(SchemaViolation::EnumTypeMismatch {
                path: path.to_string(),
                literal: literal.to_string(),
                schema_type: node.schema_type,
            });
        }
    }

    if let Some(items) = &node.items {
        validate_node(items, &format!("{path}[*]"), errors);
    }
}

fn validate_object(node: &SchemaNode, path: &str, errors: &mut Vec<SchemaViolation>) {
    if let Some(AdditionalProperties::Schema(values)) = &node.additional_properties {
        if !node.properties.is_empty() {
            errors.push(SchemaViolation::ConflictingAdditionalProperties(
                path.to_string(),
            ));
        }
        validate_node(values, &format!("{path}{{*}}"), errors);
    }

    // Applies to objects without properties too; a required key must be declared.
    for name in &node.required {
        if !node.properties.contains_key(name) {
            errors.push(SchemaViolation::RequiredWithoutProperty {
                path: path.to_string(),
                name: name.clone(),
            });
        }
    }

    for (name, child) in &node.properties {
        validate_node(child, &format!("{path}.{name}"), errors);
    }
}

fn literal_matches(literal: &Value, schema_type: SchemaType) -> bool {
    match schema_type {
        SchemaType::String => literal.is_string(),
        SchemaType::Integer => literal.is_i64() || literal.is_u64(),
        SchemaType::Number => literal.is_number(),
        SchemaType::Boolean => literal.is_boolean(),
        SchemaType::Object => literal.is_object(),
        SchemaType::Array => literal.is_array(),
    }
}
