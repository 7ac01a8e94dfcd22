//! CustomResourceDefinition assembly and registration for synthesized
//! composite schemas.
//!
//! This crate wraps schemas built by [`composite_schema_core`] into
//! `apiextensions.k8s.io/v1` documents and hands them to a registration
//! sink.
//!
//! # Quick start
//!
//! ```no_run
//! use composite_schema_core::{FieldSpec, SchemaNode};
//! use composite_schema_crd::{generate_crds, publish, CrdConfig, DirectorySink};
//!
//! // Names and version come from a YAML config
//! let config = CrdConfig::load("crd-config.yaml").unwrap();
//!
//! // Custom fields come from the caller's resource definition
//! let spec = vec![FieldSpec::required("region", SchemaNode::string())];
//! let crds = generate_crds(&config, &spec, &[]).unwrap();
//!
//! // Write one YAML file per document
//! let mut sink = DirectorySink::new("generated/");
//! publish(&mut sink, &crds).unwrap();
//! ```

mod config;
mod document;
mod error;
mod sink;

pub use config::{CrdConfig, ResourceNames};
pub use document::{
    CRD_API_VERSION, CRD_KIND, CrdNames, CrdSpec, CrdValidation, CrdVersion,
    CustomResourceDefinition, ObjectMeta, Scope, StatusSubresource, Subresources, generate_crds,
};
pub use error::{CrdError, Result};
pub use sink::{DirectorySink, Registration, RegistrationSink, publish};
