//! Errors raised while building a dependency graph.

use miette::Diagnostic;
use thiserror::Error;

/// A package source could not produce metadata for a dependency vector.
#[derive(Debug, Error, Diagnostic)]
pub enum ProviderError {
    #[error("package not found: {vector}")]
    #[diagnostic(
        code(ekdep::provider::not_found),
        help("Check the module name and version, or populate the package cache")
    )]
    NotFound { vector: String },

    #[error("failed to read package {vector}")]
    #[diagnostic(code(ekdep::provider::io))]
    Io {
        vector: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package metadata for {vector}: {message}")]
    #[diagnostic(code(ekdep::provider::parse))]
    Parse { vector: String, message: String },
}

/// Graph construction failed. No partial graph is returned.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("circular dependency detected: {path}")]
    #[diagnostic(
        code(ekdep::resolve::circular),
        help("A module may not depend on any version of itself, directly or transitively")
    )]
    CircularDependency { path: String },

    #[error("invalid version '{version}' for module {module}")]
    #[diagnostic(
        code(ekdep::resolve::invalid_version),
        help("Versions take the form major.minor.patch[-feature]-build, e.g. 1.2.3-0")
    )]
    InvalidVersion { module: String, version: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error("package fetch task failed")]
    #[diagnostic(code(ekdep::resolve::fetch_task))]
    Fetch(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_message_carries_path() {
        let err = ResolveError::CircularDependency {
            path: "A-1.0.0-0 ~> B-1.0.0-0 ~> A-1.0.0-0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "circular dependency detected: A-1.0.0-0 ~> B-1.0.0-0 ~> A-1.0.0-0"
        );
    }

    #[test]
    fn provider_error_is_transparent() {
        let err: ResolveError = ProviderError::NotFound {
            vector: "x.y-1.0.0-0".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "package not found: x.y-1.0.0-0");
    }
}
