//! The top-level shape shared by every generated resource type.

use std::sync::LazyLock;

use crate::SchemaNode;

/// Top-level keys present on every generated schema, in canonical order.
pub const TOP_LEVEL_KEYS: [&str; 5] = ["apiVersion", "kind", "metadata", "spec", "status"];

static SKELETON: LazyLock<SchemaNode> = LazyLock::new(|| {
    SchemaNode::object()
        .with_property("apiVersion", SchemaNode::string())
        .with_property("kind", SchemaNode::string())
        // The API server validates metadata itself.
        .with_property("metadata", SchemaNode::object())
        .with_property("spec", SchemaNode::object())
        .with_property("status", SchemaNode::object())
});

/// Returns the invariant top-level schema.
///
/// `metadata` is an opaque object; `spec` and `status` are empty objects
/// awaiting [`merge`](crate::merge).
///
/// # Examples
///
/// ```
/// use composite_schema_core::{skeleton, TOP_LEVEL_KEYS};
///
/// let root = skeleton();
/// let keys: Vec<&str> = root.properties.keys().map(String::as_str).collect();
/// assert_eq!(keys, TOP_LEVEL_KEYS);
/// assert!(root.property("spec").unwrap().properties.is_empty());
/// ```
pub fn skeleton() -> SchemaNode {
    SKELETON.clone()
}
