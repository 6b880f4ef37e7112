//! Core data types for ekdep.
//!
//! Semantic versions and dependency vectors, the `ekdep.toml` project
//! manifest, package metadata exchanged with package sources, and the
//! global configuration.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod manifest;
pub mod package;
pub mod vector;
pub mod version;
