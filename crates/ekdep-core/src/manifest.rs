use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::package::PackageMetadata;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "ekdep.toml";

/// The parsed representation of an `ekdep.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageSection,

    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    #[serde(default, rename = "dev-dependencies")]
    pub dev_dependencies: IndexMap<String, String>,

    /// `excludedModule = "requiredAncestorModule"`
    #[serde(default, rename = "exclude-dependencies")]
    pub exclude_dependencies: IndexMap<String, String>,
}

/// Package identity from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    /// Load and parse an `ekdep.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ekdep_util::errors::EkdepError::Manifest {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        Self::from_str(&content)
    }

    /// Parse an `ekdep.toml` from a string.
    pub fn from_str(content: &str) -> miette::Result<Self> {
        let manifest: Self =
            toml::from_str(content).map_err(|e| ekdep_util::errors::EkdepError::Manifest {
                message: format!("Failed to parse {MANIFEST_FILE}: {e}"),
            })?;
        if manifest.package.name.is_empty() || manifest.package.name.contains('-') {
            return Err(ekdep_util::errors::EkdepError::Manifest {
                message: format!(
                    "Invalid module name '{}': must be non-empty and must not contain '-'",
                    manifest.package.name
                ),
            }
            .into());
        }
        Ok(manifest)
    }

    /// The metadata the resolver consumes for this package.
    pub fn to_metadata(&self) -> PackageMetadata {
        PackageMetadata {
            module_name: self.package.name.clone(),
            version: self.package.version.clone(),
            deps: self.dependencies.clone(),
            dev_deps: self.dev_dependencies.clone(),
            exclude_deps: self.exclude_dependencies.clone(),
        }
    }
}
