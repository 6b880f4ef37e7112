//! Shared utilities for ekdep.
//!
//! Cross-cutting concerns used by the other ekdep crates: the unified error
//! type, filesystem helpers and Cargo-style terminal status output.

pub mod errors;
pub mod fs;
pub mod progress;
