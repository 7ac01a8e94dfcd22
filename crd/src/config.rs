//! Emission configuration for generated CRD documents.
//!
//! Defines the YAML-serializable settings that name the generated resource
//! types: API group, version, and the kind/plural names of the composite
//! resource and (optionally) its claim.
//!
//! # Example YAML
//!
//! ```yaml
//! group: database.example.org
//! version: v1alpha1
//! names:
//!   kind: XPostgreSQLInstance
//!   plural: xpostgresqlinstances
//! claim_names:
//!   kind: PostgreSQLInstance
//!   plural: postgresqlinstances
//!   short_names: [pgi]
//! served: true
//! storage: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CrdError, Result};

/// Kind and plural names for one generated resource type.
///
/// `singular` defaults to the lower-cased kind and `list_kind` to
/// `<kind>List`.
///
/// # Examples
///
/// ```
/// use composite_schema_crd::ResourceNames;
///
/// let names = ResourceNames::new("XBucket", "xbuckets");
/// assert_eq!(names.singular(), "xbucket");
/// assert_eq!(names.list_kind(), "XBucketList");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    /// CamelCase kind, e.g. `XPostgreSQLInstance`.
    pub kind: String,
    /// Lower-case plural used in URLs and the CRD name.
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_kind: Option<String>,
    /// Short aliases accepted by command-line clients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
}

impl ResourceNames {
    /// Creates names with derived singular and list kind.
    pub fn new(kind: &str, plural: &str) -> Self {
        Self {
            kind: kind.to_string(),
            plural: plural.to_string(),
            singular: None,
            list_kind: None,
            short_names: Vec::new(),
        }
    }

    /// Returns the singular name, derived from the kind when unset.
    pub fn singular(&self) -> String {
        self.singular
            .clone()
            .unwrap_or_else(|| self.kind.to_lowercase())
    }

    /// Returns the list kind, derived from the kind when unset.
    pub fn list_kind(&self) -> String {
        self.list_kind
            .clone()
            .unwrap_or_else(|| format!("{}List", self.kind))
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(CrdError::InvalidConfig(format!("{label} kind cannot be empty")));
        }
        if self.plural.trim().is_empty() {
            return Err(CrdError::InvalidConfig(format!(
                "{label} plural cannot be empty"
            )));
        }
        if self.plural != self.plural.to_lowercase() {
            return Err(CrdError::InvalidConfig(format!(
                "{label} plural must be lower-case: {}",
                self.plural
            )));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Settings for generating CRD documents.
///
/// Loaded from a YAML file to control how synthesized schemas are wrapped
/// into `CustomResourceDefinition` documents. When `claim_names` is set a
/// claim CRD is generated alongside the composite resource CRD.
///
/// # Examples
///
/// ```
/// use composite_schema_crd::CrdConfig;
///
/// let config = CrdConfig::from_yaml_str(
///     "group: example.org\nversion: v1\nnames: { kind: XBucket, plural: xbuckets }\n",
/// )
/// .unwrap();
/// assert!(config.served);
/// assert!(config.claim_names.is_none());
/// assert_eq!(config.crd_name(&config.names), "xbuckets.example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdConfig {
    /// API group, e.g. `database.example.org`.
    pub group: String,
    /// Version name, e.g. `v1alpha1`.
    pub version: String,
    /// Names of the composite resource type.
    pub names: ResourceNames,
    /// Names of the claim type; no claim CRD is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_names: Option<ResourceNames>,
    /// Whether the version is served by the API server.
    #[serde(default = "default_true")]
    pub served: bool,
    /// Whether the version is the storage version.
    #[serde(default = "default_true")]
    pub storage: bool,
}

impl CrdConfig {
    /// Creates a config for a composite resource without a claim.
    pub fn new(group: &str, version: &str, names: ResourceNames) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            names,
            claim_names: None,
            served: true,
            storage: true,
        }
    }

    /// Adds claim names, enabling claim CRD generation.
    pub fn with_claim_names(mut self, names: ResourceNames) -> Self {
        self.claim_names = Some(names);
        self
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::CrdError::YamlError) if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CrdError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::CrdError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CrdError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::CrdError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks that all names are usable in a CRD document.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](crate::CrdError::InvalidConfig) when the
    /// group or version is empty, a kind or plural is empty, a plural is not
    /// lower-case, or the claim reuses the composite kind or plural.
    pub fn validate(&self) -> Result<()> {
        if self.group.trim().is_empty() {
            return Err(CrdError::InvalidConfig("group cannot be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(CrdError::InvalidConfig(
                "version cannot be empty".to_string(),
            ));
        }
        self.names.validate("composite")?;

        if let Some(claim) = &self.claim_names {
            claim.validate("claim")?;
            if claim.kind == self.names.kind || claim.plural == self.names.plural {
                return Err(CrdError::InvalidConfig(format!(
                    "claim names must differ from composite names: {}",
                    claim.kind
                )));
            }
        }
        Ok(())
    }

    /// Returns the CRD object name (`<plural>.<group>`) for a set of names.
    pub fn crd_name(&self, names: &ResourceNames) -> String {
        format!("{}.{}", names.plural, self.group)
    }
}
