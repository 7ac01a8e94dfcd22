//! Schema synthesis for composite resource and claim types.
//!
//! This crate turns a caller's custom `spec`/`status` fields into a complete
//! OpenAPI v3 schema for a new orchestrable resource type:
//!
//! - [`skeleton`] — the invariant top-level shape (`apiVersion`, `kind`,
//!   `metadata`, `spec`, `status`).
//! - [`contract`] — the reserved fields each [`ResourceRole`] must carry at
//!   each [`ObjectLevel`].
//! - [`merge`] — overlays a contract block and custom fields, rejecting
//!   reserved-name collisions and computing required sets.
//! - [`printer_columns`] — default display columns per role.
//! - [`build_schema`] — composes all of the above into a
//!   [`GeneratedResource`].
//!
//! Validation ([`validate_schema`]) checks a schema tree against the
//! structural rules the API server enforces.
//!
//! Every operation is pure and synchronous. Contract tables are immutable and
//! shared, so builds may run concurrently without coordination.
//!
//! # Example
//!
//! ```
//! use composite_schema_core::*;
//!
//! let spec_fields = vec![
//!     FieldSpec::required("region", SchemaNode::string()),
//!     FieldSpec::optional("storageGB", SchemaNode::integer()),
//! ];
//! let built = build_schema(ResourceRole::CompositeResource, &spec_fields, &[]).unwrap();
//!
//! let spec = built.schema.spec().unwrap();
//! assert!(spec.property("claimRef").is_some());
//! assert!(spec.property("storageGB").is_some());
//! assert!(spec.required.contains("region"));
//! assert!(validate_schema(built.schema.root()).is_empty());
//! ```

mod build;
mod columns;
mod contract;
mod merge;
mod skeleton;
mod types;
mod validate;

pub use build::{BuildError, build_schema};
pub use columns::printer_columns;
pub use contract::{BINDING_PHASES, contract};
pub use merge::{MergeError, merge, merge_level};
pub use skeleton::{TOP_LEVEL_KEYS, skeleton};
pub use types::*;
pub use validate::{SchemaViolation, validate_schema, validate_schema_at};
