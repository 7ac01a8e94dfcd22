//! Contract and custom field merging with collision detection.
//!
//! [`merge`] overlays one [`ContractBlock`] and a caller's custom fields onto
//! the matching object level of a skeleton. Contract fields are inserted
//! first. A custom field that reuses a reserved name is accepted only when its
//! shape is identical to the contract's (the contract version is kept);
//! anything else is a [`MergeError::Collision`]. User fields never override
//! reserved ones.
//!
//! The result depends only on the two input sets: custom fields are ordered
//! by name before merging, and properties serialize lexicographically.
//!
//! # Example
//!
//! ```
//! use composite_schema_core::*;
//!
//! let custom = vec![FieldSpec::required("region", SchemaNode::string())];
//! let block = contract(ResourceRole::Claim, ObjectLevel::Spec);
//!
//! let root = merge(&skeleton(), block, &custom).unwrap();
//! let spec = root.property("spec").unwrap();
//! assert!(spec.property("region").is_some());
//! assert!(spec.property("resourceRef").is_some());
//! assert!(spec.required.contains("region"));
//! ```

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::validate::validate_schema_at;
use crate::{ContractBlock, FieldSpec, ObjectLevel, SchemaNode, SchemaViolation};

/// Errors raised while merging one object level.
///
/// All variants are deterministic functions of the inputs and indicate an
/// invalid resource definition, so none of them is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A custom field reuses a reserved contract name with a different shape.
    #[error(
        "field `{field}` in {level} collides with a reserved field: reserved {reserved}, custom {custom}"
    )]
    Collision {
        field: String,
        level: ObjectLevel,
        /// Type descriptor of the contract field.
        reserved: String,
        /// Type descriptor of the custom field.
        custom: String,
    },
    /// The same custom name was supplied twice with different shapes.
    #[error("field `{field}` is declared more than once in {level} with different schemas")]
    DuplicateField { field: String, level: ObjectLevel },
    /// A required name has no property after merging.
    #[error("required field `{field}` in {level} has no matching property")]
    RequiredWithoutProperty { field: String, level: ObjectLevel },
    /// A custom field's schema breaks a structural rule.
    #[error("field `{field}` in {level} has an invalid schema: {violation}")]
    InvalidFieldSchema {
        field: String,
        level: ObjectLevel,
        violation: SchemaViolation,
    },
}

impl MergeError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            MergeError::Collision { field, .. }
            | MergeError::DuplicateField { field, .. }
            | MergeError::RequiredWithoutProperty { field, .. }
            | MergeError::InvalidFieldSchema { field, .. } => field,
        }
    }

    /// Object level the error occurred in.
    pub fn level(&self) -> ObjectLevel {
        match self {
            MergeError::Collision { level, .. }
            | MergeError::DuplicateField { level, .. }
            | MergeError::RequiredWithoutProperty { level, .. }
            | MergeError::InvalidFieldSchema { level, .. } => *level,
        }
    }
}

/// Merges a contract block and custom fields into a skeleton.
///
/// Returns a copy of `skeleton` whose property for the contract's level
/// (`spec` or `status`) is replaced by the merged object. A skeleton without
/// that property starts from an empty object.
///
/// # Errors
///
/// Returns [`MergeError::Collision`] when a custom field reuses a reserved
/// name with a different shape. Collisions take precedence over every other
/// error. Otherwise returns [`MergeError::DuplicateField`] when custom
/// fields disagree among themselves, [`MergeError::InvalidFieldSchema`] when a
/// custom schema is structurally invalid, and
/// [`MergeError::RequiredWithoutProperty`] when a required name has no
/// property.
///
/// # Examples
///
/// ```
/// use composite_schema_core::*;
///
/// let clash = vec![FieldSpec::optional("resourceRef", SchemaNode::string())];
/// let block = contract(ResourceRole::Claim, ObjectLevel::Spec);
///
/// let err = merge(&skeleton(), block, &clash).unwrap_err();
/// assert!(matches!(err, MergeError::Collision { .. }));
/// assert_eq!(err.field(), "resourceRef");
/// assert_eq!(err.level(), ObjectLevel::Spec);
/// ```
pub fn merge(
    skeleton: &SchemaNode,
    contract: &ContractBlock,
    custom: &[FieldSpec],
) -> Result<SchemaNode, MergeError> {
    let key = contract.level().as_str();
    let base = skeleton
        .property(key)
        .cloned()
        .unwrap_or_else(SchemaNode::object);

    let merged = merge_level(&base, contract, custom)?;

    let mut root = skeleton.clone();
    root.properties.insert(key.to_string(), merged);
    Ok(root)
}

/// Merges a contract block and custom fields into one object-level node.
///
/// Any properties or required names already on `base` are kept and take part
/// in collision detection like contract fields.
pub fn merge_level(
    base: &SchemaNode,
    contract: &ContractBlock,
    custom: &[FieldSpec],
) -> Result<SchemaNode, MergeError> {
    let level = contract.level();

    let mut merged = base.clone();
    for field in contract.fields() {
        merged
            .properties
            .insert(field.name.clone(), field.schema.clone());
    }

    // Reserved names are checked before anything else about the custom set.
    check_collisions(&merged, level, custom)?;
    let custom = dedupe_custom(level, custom)?;

    let mut redundant = 0usize;
    for (name, field) in &custom {
        if merged.properties.contains_key(*name) {
            debug!(field = %name, %level, "custom field matches reserved field");
            redundant += 1;
            continue;
        }

        let path = format!("$.{level}.{name}");
        if let Some(violation) = validate_schema_at(&field.schema, &path).into_iter().next() {
            return Err(MergeError::InvalidFieldSchema {
                field: name.to_string(),
                level,
                violation,
            });
        }
        merged
            .properties
            .insert(name.to_string(), field.schema.clone());
    }

    let mut required = base.required.clone();
    required.extend(contract.required().iter().cloned());
    required.extend(
        custom
            .values()
            .filter(|f| f.required)
            .map(|f| f.name.clone()),
    );

    if let Some(missing) = required
        .iter()
        .find(|name| !merged.properties.contains_key(*name))
    {
        return Err(MergeError::RequiredWithoutProperty {
            field: missing.clone(),
            level,
        });
    }
    merged.required = required;

    debug!(
        %level,
        role = %contract.role(),
        contract_fields = contract.fields().len(),
        custom_fields = custom.len(),
        redundant,
        "merged object level"
    );
    Ok(merged)
}

/// Fails on the first custom field, by name, that reuses a name already on
/// `reserved` with a different shape.
///
/// Every copy of a repeated name is compared, so a duplicate cannot hide a
/// mismatch.
fn check_collisions(
    reserved: &SchemaNode,
    level: ObjectLevel,
    custom: &[FieldSpec],
) -> Result<(), MergeError> {
    let mut clashes: Vec<(&str, &SchemaNode, String)> = custom
        .iter()
        .filter_map(|field| {
            let existing = reserved.properties.get(&field.name)?;
            (!existing.shape_eq(&field.schema)).then(|| {
                (
                    field.name.as_str(),
                    existing,
                    field.schema.type_descriptor(),
                )
            })
        })
        .collect();
    clashes.sort_by(|a, b| (a.0, &a.2).cmp(&(b.0, &b.2)));

    match clashes.into_iter().next() {
        Some((name, existing, custom)) => Err(MergeError::Collision {
            field: name.to_string(),
            level,
            reserved: existing.type_descriptor(),
            custom,
        }),
        None => Ok(()),
    }
}

/// Collapses custom fields into a name-keyed set.
///
/// Identical duplicates are folded together (required if any copy is
/// required); duplicates with different shapes are rejected.
fn dedupe_custom<'a>(
    level: ObjectLevel,
    custom: &'a [FieldSpec],
) -> Result<BTreeMap<&'a str, FieldSpec>, MergeError> {
    let mut sorted: Vec<&FieldSpec> = custom.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut by_name: BTreeMap<&str, FieldSpec> = BTreeMap::new();
    for field in sorted {
        match by_name.get_mut(field.name.as_str()) {
            Some(existing) => {
                if !existing.schema.shape_eq(&field.schema) {
                    return Err(MergeError::DuplicateField {
                        field: field.name.clone(),
                        level,
                    });
                }
                existing.required |= field.required;
            }
            None => {
                by_name.insert(field.name.as_str(), field.clone());
            }
        }
    }
    Ok(by_name)
}
