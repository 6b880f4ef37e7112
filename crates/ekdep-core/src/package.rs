use indexmap::IndexMap;

use crate::vector::DependencyVector;
use crate::version::SemanticVersion;

/// Resolved metadata for one package, as supplied by a package source.
///
/// Dependency tables keep their declaration order; the resolver walks
/// `deps` fully before `dev_deps`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub module_name: String,
    /// `major.minor.patch[-feature]-build`
    pub version: String,
    pub deps: IndexMap<String, String>,
    pub dev_deps: IndexMap<String, String>,
    /// `excludedModule -> requiredAncestorModule`
    pub exclude_deps: IndexMap<String, String>,
}

impl PackageMetadata {
    pub fn new(module_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_dep(mut self, module_name: &str, version: &str) -> Self {
        self.deps.insert(module_name.to_string(), version.to_string());
        self
    }

    pub fn with_dev_dep(mut self, module_name: &str, version: &str) -> Self {
        self.dev_deps
            .insert(module_name.to_string(), version.to_string());
        self
    }

    pub fn with_exclusion(mut self, module_name: &str, when_dependency_of: &str) -> Self {
        self.exclude_deps
            .insert(module_name.to_string(), when_dependency_of.to_string());
        self
    }

    pub fn semantic_version(&self) -> SemanticVersion {
        SemanticVersion::parse(&self.version)
    }

    /// The `moduleName-version` text for this package.
    pub fn vector_text(&self) -> String {
        format!("{}-{}", self.module_name, self.version)
    }

    /// Parsed vector, or `None` when the version text is invalid.
    pub fn vector(&self) -> Option<DependencyVector> {
        DependencyVector::parse(&self.vector_text())
    }
}
