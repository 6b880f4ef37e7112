//! Summary of one resolution run.

use std::fmt;

use serde::Serialize;

use crate::manager::DependencyManager;
use crate::node::RejectionReason;

/// Accepted and rejected dependencies after conflict resolution, plus
/// anything that blocks the build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub root: String,
    pub accepted: Vec<String>,
    pub rejected: Vec<RejectedDependency>,
    /// Selected vectors whose major version is above one some branch needed.
    pub breaches: Vec<String>,
    pub circulars: Vec<String>,
    pub optimise_passes: usize,
}

/// A dependency taken out of the accepted set.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedDependency {
    pub vector: String,
    pub reason: Option<RejectionReason>,
    /// Path from the root, versions included.
    pub path: String,
}

impl ResolutionReport {
    /// Collect the report from a manager whose passes have run.
    pub fn from_manager(manager: &DependencyManager, optimise_passes: usize) -> Self {
        let tree = manager.tree();
        Self {
            root: manager
                .root()
                .map(|n| n.vector().to_string())
                .unwrap_or_default(),
            accepted: manager
                .report_accepted_dependencies()
                .iter()
                .map(|n| n.vector().to_string())
                .collect(),
            rejected: manager
                .report_rejected_dependencies()
                .iter()
                .map(|n| RejectedDependency {
                    vector: n.vector().to_string(),
                    reason: n.reason(),
                    path: tree.path_from_root(n.id(), true),
                })
                .collect(),
            breaches: manager
                .report_strict_semantic_version_breaches()
                .iter()
                .map(|n| n.vector().to_string())
                .collect(),
            circulars: manager.report_circular_dependencies(true),
            optimise_passes,
        }
    }

    /// True when nothing blocks the build.
    pub fn is_clean(&self) -> bool {
        self.breaches.is_empty() && self.circulars.is_empty()
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolved {}", self.root)?;
        writeln!(f, "Accepted ({}):", self.accepted.len())?;
        for vector in &self.accepted {
            writeln!(f, "  {vector}")?;
        }
        if !self.rejected.is_empty() {
            writeln!(f, "Rejected ({}):", self.rejected.len())?;
            for r in &self.rejected {
                match r.reason {
                    Some(reason) => writeln!(f, "  {} ({reason})", r.vector)?,
                    None => writeln!(f, "  {}", r.vector)?,
                }
            }
        }
        if !self.circulars.is_empty() {
            writeln!(f, "Circular dependencies ({}):", self.circulars.len())?;
            for c in &self.circulars {
                writeln!(f, "  {c}")?;
            }
        }
        if !self.breaches.is_empty() {
            writeln!(f, "Semantic version breaches ({}):", self.breaches.len())?;
            for b in &self.breaches {
                writeln!(f, "  {b}")?;
            }
        }
        Ok(())
    }
}
