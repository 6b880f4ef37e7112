//! Package sources: where the graph builder gets metadata for a dependency vector.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use ekdep_core::manifest::{Manifest, MANIFEST_FILE};
use ekdep_core::package::PackageMetadata;
use ekdep_core::vector::DependencyVector;
use tracing::debug;

use crate::error::ProviderError;

/// Resolves a `moduleName-version` vector to that package's metadata.
///
/// Implementations may do network or disk I/O; the builder calls `resolve`
/// concurrently for sibling dependencies.
pub trait PackageSource: Send + Sync {
    fn resolve(
        &self,
        vector: &DependencyVector,
    ) -> impl Future<Output = Result<PackageMetadata, ProviderError>> + Send;
}

/// In-memory source keyed by vector text.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackageSource {
    packages: HashMap<String, PackageMetadata>,
}

impl MemoryPackageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: PackageMetadata) {
        let key = metadata
            .vector()
            .map(|v| v.to_string())
            .unwrap_or_else(|| metadata.vector_text());
        self.packages.insert(key, metadata);
    }

    pub fn with(mut self, metadata: PackageMetadata) -> Self {
        self.insert(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageSource for MemoryPackageSource {
    async fn resolve(&self, vector: &DependencyVector) -> Result<PackageMetadata, ProviderError> {
        self.packages
            .get(&vector.to_string())
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                vector: vector.to_string(),
            })
    }
}

/// Reads unpacked packages from a cache directory laid out as
/// `<root>/<moduleName-version>/ekdep.toml`.
#[derive(Debug, Clone)]
pub struct DirectoryPackageSource {
    root: PathBuf,
}

impl DirectoryPackageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the unpacked package for `vector`.
    pub fn package_dir(&self, vector: &DependencyVector) -> PathBuf {
        self.root.join(vector.to_string())
    }
}

impl PackageSource for DirectoryPackageSource {
    async fn resolve(&self, vector: &DependencyVector) -> Result<PackageMetadata, ProviderError> {
        let key = vector.to_string();
        let path = self.package_dir(vector).join(MANIFEST_FILE);
        debug!(path = %path.display(), "reading package manifest");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::NotFound { vector: key });
            }
            Err(source) => return Err(ProviderError::Io { vector: key, source }),
        };

        let manifest = Manifest::from_str(&content).map_err(|e| ProviderError::Parse {
            vector: key.clone(),
            message: e.to_string(),
        })?;
        let metadata = manifest.to_metadata();

        // The directory name is the identity; the manifest inside must agree.
        let found = metadata.vector();
        if found.as_ref() != Some(vector) {
            return Err(ProviderError::Parse {
                vector: key,
                message: format!("manifest declares {}", metadata.vector_text()),
            });
        }
        Ok(metadata)
    }
}
