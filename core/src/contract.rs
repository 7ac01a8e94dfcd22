//! Reserved contract fields for composite resources and claims.
//!
//! Every generated resource type must carry these exact field names, types
//! and required markers to be recognized as orchestrable. The tables are
//! built once on first use and shared read-only afterwards.
//!
//! | Level  | Both roles                                              | Composite only              | Claim only    |
//! |--------|---------------------------------------------------------|-----------------------------|---------------|
//! | spec   | `compositionRef`, `compositionSelector`, `writeConnectionSecretToRef` | `claimRef`, `resourceRefs` | `resourceRef` |
//! | status | `composedResources`, `readyResources`, `bindingPhase`, `conditions` | | |
//!
//! `writeConnectionSecretToRef` requires `name` and `namespace` on composite
//! resources (they are cluster scoped) but only `name` on claims, whose
//! secret lives in the claim's own namespace.

use std::sync::LazyLock;

use crate::{AdditionalProperties, ContractBlock, FieldSpec, ObjectLevel, ResourceRole, SchemaNode};

/// Literal values of `status.bindingPhase`, in wire order.
pub const BINDING_PHASES: [&str; 4] = ["Unbindable", "Unbound", "Bound", "Released"];

static COMPOSITE_SPEC: LazyLock<ContractBlock> = LazyLock::new(|| {
    let mut fields = shared_spec_fields();
    fields.push(FieldSpec::optional(
        "claimRef",
        string_object(&["apiVersion", "kind", "namespace", "name"], &[]),
    ));
    fields.push(FieldSpec::optional(
        "resourceRefs",
        SchemaNode::array(string_object(&["apiVersion", "kind", "name"], &["uid"])),
    ));
    fields.push(FieldSpec::optional(
        "writeConnectionSecretToRef",
        string_object(&["name", "namespace"], &[]),
    ));
    ContractBlock::new(ResourceRole::CompositeResource, ObjectLevel::Spec, fields)
});

static CLAIM_SPEC: LazyLock<ContractBlock> = LazyLock::new(|| {
    let mut fields = shared_spec_fields();
    fields.push(FieldSpec::optional(
        "resourceRef",
        string_object(&["apiVersion", "kind", "name"], &[]),
    ));
    fields.push(FieldSpec::optional(
        "writeConnectionSecretToRef",
        string_object(&["name"], &[]),
    ));
    ContractBlock::new(ResourceRole::Claim, ObjectLevel::Spec, fields)
});

static COMPOSITE_STATUS: LazyLock<ContractBlock> = LazyLock::new(|| {
    ContractBlock::new(
        ResourceRole::CompositeResource,
        ObjectLevel::Status,
        shared_status_fields(),
    )
});

static CLAIM_STATUS: LazyLock<ContractBlock> = LazyLock::new(|| {
    ContractBlock::new(ResourceRole::Claim, ObjectLevel::Status, shared_status_fields())
});

/// Returns the contract block for a role and object level.
///
/// Defined for all four combinations. The returned block is a shared,
/// immutable table.
///
/// # Examples
///
/// ```
/// use composite_schema_core::*;
///
/// let spec = contract(ResourceRole::Claim, ObjectLevel::Spec);
/// assert!(spec.contains("resourceRef"));
/// assert!(!spec.contains("resourceRefs"));
///
/// let spec = contract(ResourceRole::CompositeResource, ObjectLevel::Spec);
/// assert!(spec.contains("resourceRefs"));
/// assert!(spec.contains("claimRef"));
/// ```
pub fn contract(role: ResourceRole, level: ObjectLevel) -> &'static ContractBlock {
    match (role, level) {
        (ResourceRole::CompositeResource, ObjectLevel::Spec) => &*COMPOSITE_SPEC,
        (ResourceRole::CompositeResource, ObjectLevel::Status) => &*COMPOSITE_STATUS,
        (ResourceRole::Claim, ObjectLevel::Spec) => &*CLAIM_SPEC,
        (ResourceRole::Claim, ObjectLevel::Status) => &*CLAIM_STATUS,
    }
}

/// Composition reference and selector; optional alternatives on both roles.
fn shared_spec_fields() -> Vec<FieldSpec> {
    let match_labels = SchemaNode::object().with_additional_properties(
        AdditionalProperties::Schema(Box::new(SchemaNode::string())),
    );

    vec![
        FieldSpec::optional("compositionRef", string_object(&["name"], &[])),
        FieldSpec::optional(
            "compositionSelector",
            SchemaNode::object().with_required_property("matchLabels", match_labels),
        ),
    ]
}

fn shared_status_fields() -> Vec<FieldSpec> {
    let condition = SchemaNode::object()
        .with_required_property(
            "lastTransitionTime",
            SchemaNode::string().with_format("date-time"),
        )
        .with_property("message", SchemaNode::string())
        .with_required_property("reason", SchemaNode::string())
        .with_required_property("status", SchemaNode::string())
        .with_required_property("type", SchemaNode::string());

    vec![
        FieldSpec::optional("composedResources", SchemaNode::integer()),
        FieldSpec::optional("readyResources", SchemaNode::integer()),
        FieldSpec::optional(
            "bindingPhase",
            SchemaNode::string().with_enum(BINDING_PHASES),
        ),
        FieldSpec::optional(
            "conditions",
            SchemaNode::array(condition).with_description("Conditions of the resource."),
        ),
    ]
}

/// An object of string properties, `required` first then `optional`.
fn string_object(required: &[&str], optional: &[&str]) -> SchemaNode {
    let node = required.iter().fold(SchemaNode::object(), |node, name| {
        node.with_required_property(name, SchemaNode::string())
    });
    optional.iter().fold(node, |node, name| {
        node.with_property(name, SchemaNode::string())
    })
}
