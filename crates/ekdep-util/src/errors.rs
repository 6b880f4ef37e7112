use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for ekdep operations outside the resolver core.
#[derive(Debug, Error, Diagnostic)]
pub enum EkdepError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed project manifest (`ekdep.toml`).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your ekdep.toml for syntax errors"))]
    Manifest { message: String },

    /// Invalid or malformed global configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.ekdep/config.toml or unset EKDEP_HOME"))]
    Config { message: String },

    /// Dependency resolution could not produce a usable set.
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type EkdepResult<T> = miette::Result<T>;
