//! CLI argument definitions for ekdep.
//!
//! Each command corresponds to a handler in the [`super::commands`] module.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ekdep",
    version,
    about = "Dependency resolution for ekdep packages",
    long_about = "ekdep builds the full dependency tree of a package from the local package \
                  cache, then settles on exactly one version of every module: developer \
                  exclusions first, then the highest version wins, then anything no longer \
                  reachable is dropped. Circular dependencies and major version breaches fail \
                  the run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Package cache directory (overrides [cache] dir in config.toml)
    #[arg(long, global = true, env = "EKDEP_CACHE")]
    pub cache_dir: Option<std::path::PathBuf>,

    /// Maximum concurrent package metadata fetches
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve dependencies and report accepted and rejected versions
    Resolve {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
        /// Hide rejected dependencies
        #[arg(long)]
        accepted: bool,
        /// Show every path from the root to a module
        #[arg(long)]
        why: Option<String>,
    },

    /// Print or change the package version
    Version {
        #[command(subcommand)]
        action: Option<VersionCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum VersionCommand {
    /// Print the current version
    Print,
    /// Increment one part of the version, resetting the parts below it
    Bump {
        part: Part,
    },
    /// Set the version to major.minor.patch[-feature] with build number 0
    Set {
        version: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Part {
    Major,
    Minor,
    Patch,
    Build,
}

pub fn parse() -> Cli {
    Cli::parse()
}
