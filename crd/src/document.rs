//! `CustomResourceDefinition` documents for synthesized schemas.
//!
//! Wraps a [`GeneratedResource`] into an `apiextensions.k8s.io/v1`
//! document ready for a [`RegistrationSink`](crate::RegistrationSink).
//! Composite resources are cluster scoped; claims are namespaced.
//!
//! # Examples
//!
//! ```
//! use composite_schema_core::{FieldSpec, SchemaNode};
//! use composite_schema_crd::{generate_crds, CrdConfig, ResourceNames, Scope};
//!
//! let config = CrdConfig::new("example.org", "v1alpha1", ResourceNames::new("XBucket", "xbuckets"))
//!     .with_claim_names(ResourceNames::new("Bucket", "buckets"));
//! let spec = vec![FieldSpec::required("region", SchemaNode::string())];
//!
//! let crds = generate_crds(&config, &spec, &[]).unwrap();
//! assert_eq!(crds.len(), 2);
//! assert_eq!(crds[0].metadata.name, "xbuckets.example.org");
//! assert_eq!(crds[0].spec.scope, Scope::Cluster);
//! assert_eq!(crds[1].spec.scope, Scope::Namespaced);
//! ```

use composite_schema_core::{
    FieldSpec, GeneratedResource, GeneratedSchema, PrinterColumn, ResourceRole, build_schema,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::{CrdConfig, ResourceNames};
use crate::error::Result;

/// `apiVersion` of generated documents.
pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1";

/// `kind` of generated documents.
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// Whether instances live in a namespace or at cluster level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Cluster,
    Namespaced,
}

impl Scope {
    /// Scope used for a role's instances.
    pub fn for_role(role: ResourceRole) -> Self {
        match role {
            ResourceRole::CompositeResource => Scope::Cluster,
            ResourceRole::Claim => Scope::Namespaced,
        }
    }
}

/// Object metadata of a CRD document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// `<plural>.<group>`.
    pub name: String,
}

/// The `spec.names` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdNames {
    pub kind: String,
    pub list_kind: String,
    pub plural: String,
    pub singular: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl CrdNames {
    fn from_names(names: &ResourceNames, role: ResourceRole) -> Self {
        let category = match role {
            ResourceRole::CompositeResource => "composite",
            ResourceRole::Claim => "claim",
        };
        Self {
            kind: names.kind.clone(),
            list_kind: names.list_kind(),
            plural: names.plural.clone(),
            singular: names.singular(),
            short_names: names.short_names.clone(),
            categories: vec![category.to_string()],
        }
    }
}

/// The `schema` block of a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrdValidation {
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: GeneratedSchema,
}

/// Marker enabling the `/status` subresource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSubresource {}

/// The `subresources` block of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subresources {
    pub status: StatusSubresource,
}

/// One served version of the resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdVersion {
    pub name: String,
    pub served: bool,
    pub storage: bool,
    pub schema: CrdValidation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_printer_columns: Vec<PrinterColumn>,
    #[serde(default)]
    pub subresources: Subresources,
}

/// The `spec` block of a CRD document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrdSpec {
    pub group: String,
    pub names: CrdNames,
    pub scope: Scope,
    pub versions: Vec<CrdVersion>,
}

/// A complete `apiextensions.k8s.io/v1` `CustomResourceDefinition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CrdSpec,
}

impl CustomResourceDefinition {
    /// Wraps a generated resource into a CRD document.
    ///
    /// Scope and category follow the generated resource's role; version
    /// flags come from `config`.
    pub fn new(config: &CrdConfig, names: &ResourceNames, generated: GeneratedResource) -> Self {
        let GeneratedResource {
            role,
            schema,
            printer_columns,
        } = generated;

        Self {
            api_version: CRD_API_VERSION.to_string(),
            kind: CRD_KIND.to_string(),
            metadata: ObjectMeta {
                name: config.crd_name(names),
            },
            spec: CrdSpec {
                group: config.group.clone(),
                names: CrdNames::from_names(names, role),
                scope: Scope::for_role(role),
                versions: vec![CrdVersion {
                    name: config.version.clone(),
                    served: config.served,
                    storage: config.storage,
                    schema: CrdValidation {
                        open_api_v3_schema: schema,
                    },
                    additional_printer_columns: printer_columns,
                    subresources: Subresources::default(),
                }],
            },
        }
    }

    /// Returns the object name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Serializes the document as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::CrdError::JsonError) if serialization
    /// fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::CrdError::YamlError) if serialization
    /// fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Computes the SHA-256 hex digest of the canonical JSON form.
    ///
    /// Schema maps serialize in lexicographic key order, so equal documents
    /// always share a fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::CrdError::JsonError) if serialization
    /// fails.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let hash = Sha256::digest(&bytes);
        Ok(format!("{:x}", hash))
    }
}

/// Generates the composite resource CRD and, when configured, the claim CRD.
///
/// Both documents share the same custom fields; the contract differs per
/// role.
///
/// # Errors
///
/// Returns [`InvalidConfig`](crate::CrdError::InvalidConfig) for an unusable
/// config and [`Build`](crate::CrdError::Build) when the custom fields fail
/// to merge for either role.
pub fn generate_crds(
    config: &CrdConfig,
    custom_spec: &[FieldSpec],
    custom_status: &[FieldSpec],
) -> Result<Vec<CustomResourceDefinition>> {
    config.validate()?;

    let mut targets = vec![(ResourceRole::CompositeResource, &config.names)];
    if let Some(claim_names) = &config.claim_names {
        targets.push((ResourceRole::Claim, claim_names));
    }

    let mut crds = Vec::with_capacity(targets.len());
    for (role, names) in targets {
        let generated = build_schema(role, custom_spec, custom_status)?;
        let crd = CustomResourceDefinition::new(config, names, generated);
        debug!(name = crd.name(), %role, "assembled custom resource definition");
        crds.push(crd);
    }
    Ok(crds)
}
