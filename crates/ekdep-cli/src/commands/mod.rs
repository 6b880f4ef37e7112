//! Command dispatch and handler modules.

mod resolve;
mod tree;
mod version;

use std::path::PathBuf;

use ekdep_core::manifest::MANIFEST_FILE;
use ekdep_ops::ops_resolve::ResolveOptions;
use ekdep_util::errors::EkdepError;
use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let resolve_opts = |json: bool| ResolveOptions {
        json,
        verbose: cli.verbose,
        cache_dir: cli.cache_dir.clone(),
        jobs: cli.jobs,
    };
    match cli.command {
        Command::Resolve { json } => resolve::exec(resolve_opts(json)).await,
        Command::Tree {
            depth,
            accepted,
            ref why,
        } => tree::exec(depth, accepted, why.clone(), resolve_opts(false)).await,
        Command::Version { ref action } => version::exec(action.as_ref()),
    }
}

/// The nearest directory at or above the working directory holding an `ekdep.toml`.
fn project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(EkdepError::Io)?;
    ekdep_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
        EkdepError::Manifest {
            message: format!("No {MANIFEST_FILE} found in current directory or any parent"),
        }
        .into()
    })
}
