//! Registration of finished CRD documents.
//!
//! A [`RegistrationSink`] accepts a finished document and reports whether it
//! was accepted. Rejections are ordinary values; only transport failures
//! (I/O, serialization) are errors. [`DirectorySink`] writes each document
//! as `<name>.yaml` and refuses to replace a file whose content drifted.
//!
//! # Examples
//!
//! ```no_run
//! use composite_schema_crd::{generate_crds, publish, CrdConfig, DirectorySink};
//!
//! let config = CrdConfig::load("crd-config.yaml").unwrap();
//! let crds = generate_crds(&config, &[], &[]).unwrap();
//!
//! let mut sink = DirectorySink::new("generated/");
//! for registration in publish(&mut sink, &crds).unwrap() {
//!     println!("{registration:?}");
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::CustomResourceDefinition;
use crate::error::Result;

/// Outcome of registering one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registration {
    /// The document was stored (or was already stored unchanged).
    Accepted {
        name: String,
        /// SHA-256 fingerprint of the accepted document.
        fingerprint: String,
    },
    /// The document was refused.
    Rejected { name: String, reason: String },
}

impl Registration {
    /// Returns `true` for [`Registration::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Registration::Accepted { .. })
    }

    /// Name of the registered document.
    pub fn name(&self) -> &str {
        match self {
            Registration::Accepted { name, .. } | Registration::Rejected { name, .. } => name,
        }
    }
}

/// Destination for finished CRD documents.
pub trait RegistrationSink {
    /// Registers one document.
    ///
    /// # Errors
    ///
    /// Returns an error only when the sink itself fails; refusals are
    /// reported as [`Registration::Rejected`].
    fn register(&mut self, crd: &CustomResourceDefinition) -> Result<Registration>;
}

/// Writes documents as YAML files into a directory.
///
/// Re-registering identical content is accepted without rewriting. Content
/// that differs from an existing file is rejected unless
/// [`overwrite`](DirectorySink::overwrite) is enabled.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    /// Creates a sink writing into `dir`. The directory is created on first
    /// registration.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    /// Allows replacing files whose content changed.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a document with `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.yaml"))
    }
}

impl RegistrationSink for DirectorySink {
    fn register(&mut self, crd: &CustomResourceDefinition) -> Result<Registration> {
        let name = crd.name().to_string();
        let path = self.path_for(&name);
        let yaml = crd.to_yaml()?;
        let fingerprint = crd.fingerprint()?;

        if path.exists() {
            let existing = std::fs::read_to_string(&path)?;
            if existing == yaml {
                return Ok(Registration::Accepted { name, fingerprint });
            }
            if !self.overwrite {
                return Ok(Registration::Rejected {
                    reason: format!("{} exists with different content", path.display()),
                    name,
                });
            }
        }

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, yaml)?;
        Ok(Registration::Accepted { name, fingerprint })
    }
}

/// Registers every document with `sink`, in order.
///
/// # Errors
///
/// Stops at the first sink failure.
pub fn publish<S: RegistrationSink + ?Sized>(
    sink: &mut S,
    crds: &[CustomResourceDefinition],
) -> Result<Vec<Registration>> {
    let mut registrations = Vec::with_capacity(crds.len());
    for crd in crds {
        let registration = sink.register(crd)?;
        match &registration {
            Registration::Accepted { name, fingerprint } => {
                info!(%name, %fingerprint, "registered custom resource definition");
            }
            Registration::Rejected { name, reason } => {
                warn!(%name, %reason, "custom resource definition rejected");
            }
        }
        registrations.push(registration);
    }
    Ok(registrations)
}
