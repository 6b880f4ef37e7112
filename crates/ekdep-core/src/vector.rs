use std::fmt;

use crate::version::SemanticVersion;

/// A dependency vector: `moduleName-major.minor.patch[-feature]-build`.
///
/// This text form names cache directories and package artifacts, e.g.
/// `ekopen.net.handy.tools-3.2.1-0` or `ekopen.tools-1.0.8-featureX-5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyVector {
    pub module_name: String,
    pub version: SemanticVersion,
}

impl DependencyVector {
    pub fn new(module_name: impl Into<String>, version: SemanticVersion) -> Self {
        Self {
            module_name: module_name.into(),
            version,
        }
    }

    /// Parse `"moduleName-version"`.
    ///
    /// Module names never contain `-`, so the first `-` separates the name
    /// from the version. Returns `None` when there is no separator, the name
    /// is empty, or the version does not parse.
    pub fn parse(text: &str) -> Option<Self> {
        let (module_name, version) = text.split_once('-')?;
        if module_name.is_empty() {
            return None;
        }
        let version = SemanticVersion::parse(version);
        version
            .is_valid()
            .then(|| Self::new(module_name, version))
    }
}

impl fmt::Display for DependencyVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.module_name, self.version)
    }
}
