//! Conflict resolution over a fully built dependency tree.
//!
//! Every module must end up with exactly one accepted version. The passes
//! run in a fixed order, each building on the rejection state left by the
//! previous one:
//!
//! 1. circular dependency check (fatal),
//! 2. developer exclusions via [`DependencyManager::reject`],
//! 3. [`DependencyManager::rationalise`]: keep the highest non-rejected
//!    version of each module,
//! 4. [`DependencyManager::optimise`] until stable: drop modules that are
//!    now only reachable through rejected ancestors,
//! 5. strict semantic version breach check (fatal).
//!
//! Dependencies are recompiled from source, so a higher major version
//! replacing a lower one some branch asked for is an interface mismatch,
//! never something to paper over.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::node::{DependencyNode, DependencyTree, NodeId, RejectionReason};

/// Upper bound on optimisation passes. Guarantees termination only; real
/// trees settle in a handful of passes.
pub const MAX_OPTIMISE_PASSES: usize = 100;

/// Outcome of [`DependencyManager::optimise_until_stable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimiseSummary {
    /// Number of `optimise()` calls made, including the final no-change one.
    pub passes: usize,
    /// False when [`MAX_OPTIMISE_PASSES`] ran out while passes still made changes.
    pub converged: bool,
}

/// Applies exclusions, rationalisation and optimisation to a dependency
/// tree, and reports on the result. Only rejection state is ever changed.
#[derive(Debug, Clone, Default)]
pub struct DependencyManager {
    tree: DependencyTree,
}

impl DependencyManager {
    pub fn new(tree: DependencyTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    pub fn into_tree(self) -> DependencyTree {
        self.tree
    }

    pub fn root(&self) -> Option<&DependencyNode> {
        self.tree.root().map(|id| &self.tree[id])
    }

    pub fn node(&self, id: NodeId) -> &DependencyNode {
        &self.tree[id]
    }

    /// Direct write access to a node's rejection state.
    pub fn set_rejected(
        &mut self,
        id: NodeId,
        reason: RejectionReason,
        rejected: bool,
        also_reject_descendants: bool,
    ) {
        self.tree
            .set_rejected(id, reason, rejected, also_reject_descendants);
    }

    /// Node ids grouped by module name, each group sorted by descending
    /// version. Equal versions keep pre-order position (stable sort), which
    /// makes "first non-rejected wins" reproducible.
    fn index_by_module_name(&self) -> BTreeMap<String, Vec<NodeId>> {
        let mut index: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        if let Some(root) = self.tree.root() {
            for id in self.tree.pre_order(root) {
                index
                    .entry(self.tree[id].module_name().to_string())
                    .or_default()
                    .push(id);
            }
        }
        for ids in index.values_mut() {
            ids.sort_by(|a, b| self.tree[*b].version().cmp(self.tree[*a].version()));
        }
        index
    }

    /// Every node named `module_name`, highest version first.
    pub fn find_by_module_name(&self, module_name: &str) -> Vec<&DependencyNode> {
        self.index_by_module_name()
            .remove(module_name)
            .unwrap_or_default()
            .into_iter()
            .map(|id| &self.tree[id])
            .collect()
    }

    /// All distinct module names in the tree.
    pub fn list_all_module_names(&self) -> BTreeSet<String> {
        self.index_by_module_name().into_keys().collect()
    }

    /// Every module name from the root down, in pre-order, repeats included.
    pub fn report_all_dependencies(&self) -> Vec<String> {
        self.tree
            .root()
            .map(|root| self.tree.collect_all_module_names(root))
            .unwrap_or_default()
    }

    /// Keep the highest non-rejected version of every module and reject the
    /// rest: `SameVersion` for duplicates of the selected version,
    /// `Rationalisation` for anything lower.
    pub fn rationalise(&mut self) {
        for (module, ids) in self.index_by_module_name() {
            let mut selected: Option<NodeId> = None;
            for id in ids {
                if self.tree[id].is_rejected() {
                    continue;
                }
                let Some(sel) = selected else {
                    selected = Some(id);
                    continue;
                };
                let reason = if self.tree[sel].version() == self.tree[id].version() {
                    RejectionReason::SameVersion
                } else {
                    RejectionReason::Rationalisation
                };
                debug!(
                    module = %module,
                    rejected = %self.tree[id].version(),
                    selected = %self.tree[sel].version(),
                    %reason,
                    "rationalised"
                );
                self.tree.set_rejected(id, reason, true, false);
            }
        }
    }

    /// Reject every `module_name` node that sits below a node named
    /// `when_dependency_of`, together with everything it pulled in.
    pub fn reject(&mut self, module_name: &str, when_dependency_of: &str) {
        let ids = self
            .index_by_module_name()
            .remove(module_name)
            .unwrap_or_default();
        for id in ids {
            if self.tree.is_dependency_of(id, when_dependency_of) {
                debug!(node = %self.tree[id], when_dependency_of, "manually excluded");
                self.tree
                    .set_rejected(id, RejectionReason::Manual, true, true);
            }
        }
    }

    /// Exclusion rules declared by accepted nodes, in pre-order, first
    /// declaration wins on duplicates.
    pub fn exclusion_rules(&self) -> Vec<(String, String)> {
        let mut rules: Vec<(String, String)> = Vec::new();
        let Some(root) = self.tree.root() else {
            return rules;
        };
        for id in self.tree.pre_order(root) {
            let node = &self.tree[id];
            if node.is_rejected() {
                continue;
            }
            for (module, ancestor) in node.exclusion_rules() {
                let rule = (module.clone(), ancestor.clone());
                if !rules.contains(&rule) {
                    rules.push(rule);
                }
            }
        }
        rules
    }

    /// Apply [`Self::exclusion_rules`] through [`Self::reject`]. Returns the
    /// number of rules applied.
    pub fn apply_exclusions(&mut self) -> usize {
        let rules = self.exclusion_rules();
        for (module, ancestor) in &rules {
            info!(module = %module, when_dependency_of = %ancestor, "applying exclusion");
            self.reject(module, ancestor);
        }
        rules.len()
    }

    /// One optimisation pass. A module whose every node has a rejected parent
    /// is no longer needed at any version: its remaining nodes are rejected
    /// as `Optimised` (descendants are left for later passes).
    ///
    /// Returns whether anything changed. Call repeatedly until it returns
    /// `false`, see [`Self::optimise_until_stable`].
    pub fn optimise(&mut self) -> bool {
        let mut changed = false;
        for (module, ids) in self.index_by_module_name() {
            let all_ancestors_rejected = ids.iter().all(|id| self.tree.is_parent_rejected(*id));
            let all_already_rejected = ids.iter().all(|id| self.tree[*id].is_rejected());
            if !all_ancestors_rejected || all_already_rejected {
                continue;
            }
            for id in ids {
                if !self.tree[id].is_rejected() {
                    debug!(module = %module, node = %self.tree[id], "optimised away");
                    self.tree
                        .set_rejected(id, RejectionReason::Optimised, true, false);
                }
            }
            changed = true;
        }
        changed
    }

    /// Run [`Self::optimise`] until a pass makes no change, at most
    /// [`MAX_OPTIMISE_PASSES`] times.
    pub fn optimise_until_stable(&mut self) -> OptimiseSummary {
        for pass in 1..=MAX_OPTIMISE_PASSES {
            if !self.optimise() {
                debug!(passes = pass, "optimisation settled");
                return OptimiseSummary {
                    passes: pass,
                    converged: true,
                };
            }
        }
        warn!(
            passes = MAX_OPTIMISE_PASSES,
            "optimisation still changing the tree after the pass limit; result may keep unneeded dependencies"
        );
        OptimiseSummary {
            passes: MAX_OPTIMISE_PASSES,
            converged: false,
        }
    }

    /// Selected nodes whose major version is above that of some rejected
    /// node of the same module. Any entry here blocks the build.
    pub fn report_strict_semantic_version_breaches(&self) -> Vec<&DependencyNode> {
        let mut breaches: Vec<&DependencyNode> = Vec::new();
        for ids in self.index_by_module_name().into_values() {
            let Some(selected) = ids
                .iter()
                .map(|id| &self.tree[*id])
                .find(|n| !n.is_rejected())
            else {
                continue;
            };
            let breached = ids.iter().map(|id| &self.tree[*id]).any(|n| {
                n.id() != selected.id()
                    && n.is_rejected()
                    && n.version().major() < selected.version().major()
            });
            if breached && !breaches.iter().any(|b| b.same_vector(selected)) {
                breaches.push(selected);
            }
        }
        breaches
    }

    /// Every circular path in the tree. The root itself is not checked.
    pub fn report_circular_dependencies(&self, include_version: bool) -> Vec<String> {
        let Some(root) = self.tree.root() else {
            return Vec::new();
        };
        self.tree
            .pre_order(root)
            .skip(1)
            .filter_map(|id| self.tree.detect_circular_dependency(id, include_version))
            .collect()
    }

    pub fn report_rejected_dependencies(&self) -> Vec<&DependencyNode> {
        self.report_filtered(|n| n.is_rejected())
    }

    pub fn report_accepted_dependencies(&self) -> Vec<&DependencyNode> {
        self.report_filtered(|n| !n.is_rejected())
    }

    fn report_filtered(&self, predicate: impl Fn(&DependencyNode) -> bool) -> Vec<&DependencyNode> {
        self.index_by_module_name()
            .into_values()
            .flatten()
            .map(|id| &self.tree[id])
            .filter(|n| predicate(n))
            .collect()
    }
}
