//! Dependency resolution engine: builds the full dependency tree for a
//! package, then settles on one version per module through exclusions,
//! rationalisation and optimisation, reporting circular dependencies and
//! major version breaches.

pub mod builder;
pub mod error;
pub mod manager;
pub mod node;
pub mod provider;
pub mod report;
pub mod tree;
