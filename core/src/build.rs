//! End-to-end schema synthesis for one role.

use thiserror::Error;
use tracing::info;

use crate::{
    FieldSpec, GeneratedResource, GeneratedSchema, MergeError, ObjectLevel, ResourceRole,
    contract, merge, printer_columns, skeleton,
};

/// A failed build, tagged with the object level whose merge failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to build {level} schema: {source}")]
pub struct BuildError {
    /// Level that failed to merge.
    pub level: ObjectLevel,
    /// The underlying merge failure.
    #[source]
    pub source: MergeError,
}

impl BuildError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        self.source.field()
    }

    /// Returns `true` if the build failed on a reserved-name collision.
    pub fn is_collision(&self) -> bool {
        matches!(self.source, MergeError::Collision { .. })
    }
}

/// Builds the complete schema and default printer columns for a role.
///
/// Merges `custom_spec` into `spec` and then `custom_status` into `status`,
/// stopping at the first failure. Either both levels merge and a complete
/// [`GeneratedResource`] is returned, or nothing is.
///
/// # Errors
///
/// Returns a [`BuildError`] wrapping the first [`MergeError`].
///
/// # Examples
///
/// ```
/// use composite_schema_core::*;
///
/// let region = FieldSpec::required("region", SchemaNode::string());
/// let built = build_schema(ResourceRole::Claim, &[region], &[]).unwrap();
///
/// let spec = built.schema.spec().unwrap();
/// assert!(spec.property("resourceRef").is_some());
/// assert!(spec.property("resourceRefs").is_none());
/// assert_eq!(spec.required.iter().collect::<Vec<_>>(), ["region"]);
/// assert_eq!(built.printer_columns[2].name, "CONNECTION-SECRET");
///
/// let clash = FieldSpec::optional("conditions", SchemaNode::string());
/// let err = build_schema(ResourceRole::Claim, &[], &[clash]).unwrap_err();
/// assert_eq!(err.level, ObjectLevel::Status);
/// assert!(err.is_collision());
/// ```
pub fn build_schema(
    role: ResourceRole,
    custom_spec: &[FieldSpec],
    custom_status: &[FieldSpec],
) -> Result<GeneratedResource, BuildError> {
    let mut root = skeleton();
    for (level, custom) in [
        (ObjectLevel::Spec, custom_spec),
        (ObjectLevel::Status, custom_status),
    ] {
        root = merge(&root, contract(role, level), custom)
            .map_err(|source| BuildError { level, source })?;
    }

    info!(
        %role,
        spec_fields = custom_spec.len(),
        status_fields = custom_status.len(),
        "built resource schema"
    );
    Ok(GeneratedResource {
        role,
        schema: GeneratedSchema::new(root),
        printer_columns: printer_columns(role),
    })
}

#[cfg(test)]
mod tests {
    use crate::{SchemaNode, validate_schema};

    use super::*;

    #[test]
    fn test_build_composite_defaults() {
        let built = build_schema(ResourceRole::CompositeResource, &[], &[]).unwrap();
        assert_eq!(built.role, ResourceRole::CompositeResource);

        let spec = built.schema.spec().unwrap();
        for name in [
            "compositionRef",
            "compositionSelector",
            "claimRef",
            "resourceRefs",
            "writeConnectionSecretToRef",
        ] {
            assert!(spec.property(name).is_some(), "missing {name}");
        }
        assert!(spec.required.is_empty());
        assert!(validate_schema(built.schema.root()).is_empty());
    }

    #[test]
    fn test_build_short_circuits_on_spec_failure() {
        let bad_spec = vec![FieldSpec::optional("claimRef", SchemaNode::string())];
        let bad_status = vec![FieldSpec::optional("conditions", SchemaNode::string())];

        let err = build_schema(ResourceRole::CompositeResource, &bad_spec, &bad_status)
            .unwrap_err();
        assert_eq!(err.level, ObjectLevel::Spec);
        assert_eq!(err.field(), "claimRef");
    }

    #[test]
    fn test_build_error_message_names_level_and_field() {
        let bad = vec![FieldSpec::optional("readyResources", SchemaNode::string())];
        let err = build_schema(ResourceRole::Claim, &[], &bad).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("status"));
        assert!(message.contains("readyResources"));
        assert!(message.contains("integer"));
    }
}
