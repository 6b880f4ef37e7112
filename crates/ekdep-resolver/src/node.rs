//! Arena-backed dependency tree.
//!
//! Every occurrence of a module in the tree is its own [`DependencyNode`],
//! even when the same module and version is reachable along several paths.
//! Nodes are addressed by [`NodeId`]; children are owned id lists and the
//! parent link is a plain id, so walking up and down needs no reference
//! counting. Nodes are never removed, only flagged as rejected.

use std::fmt;
use std::ops::Index;

use ekdep_core::vector::DependencyVector;
use ekdep_core::version::SemanticVersion;
use indexmap::IndexMap;
use serde::Serialize;

/// Separator used when rendering a path through the tree.
pub const PATH_SEPARATOR: &str = " ~> ";

/// Index of a node within its [`DependencyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Why a node was taken out of the accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// Excluded by an `exclude-dependencies` rule.
    Manual,
    /// A higher version of the same module was selected.
    Rationalisation,
    /// The selected node already has this exact version.
    SameVersion,
    /// Only reachable through rejected ancestors.
    Optimised,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "MANUAL",
            Self::Rationalisation => "RATIONALISATION",
            Self::SameVersion => "SAME_VERSION",
            Self::Optimised => "OPTIMISED",
        })
    }
}

/// Which dependency table declared a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Normal,
    Dev,
}

/// One module at one version, at one position in the tree.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    id: NodeId,
    module_name: String,
    version: SemanticVersion,
    kind: DependencyKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rejected: bool,
    reason: Option<RejectionReason>,
    /// `excludedModule -> requiredAncestorModule`, declared by this node.
    exclusion_rules: IndexMap<String, String>,
}

impl DependencyNode {
    fn new(id: NodeId, module_name: &str, version: &str, kind: DependencyKind) -> Self {
        Self {
            id,
            module_name: module_name.to_string(),
            version: SemanticVersion::parse(version),
            kind,
            parent: None,
            children: Vec::new(),
            rejected: false,
            reason: None,
            exclusion_rules: IndexMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn version(&self) -> &SemanticVersion {
        &self.version
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        self.reason
    }

    pub fn exclusion_rules(&self) -> &IndexMap<String, String> {
        &self.exclusion_rules
    }

    pub fn vector(&self) -> DependencyVector {
        DependencyVector::new(self.module_name.clone(), self.version.clone())
    }

    /// Identity for comparison purposes: same module name and version.
    pub fn same_vector(&self, other: &DependencyNode) -> bool {
        self.module_name == other.module_name && self.version == other.version
    }

    /// `name` or `name-version`, with ` (REASON)` appended when rejected.
    pub fn render(&self, include_version: bool) -> String {
        let mut out = if include_version {
            format!("{}-{}", self.module_name, self.version)
        } else {
            self.module_name.clone()
        };
        if let (true, Some(reason)) = (self.rejected, self.reason) {
            out.push_str(&format!(" ({reason})"));
        }
        out
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

/// Owner of every node created while building one dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyTree {
    nodes: Vec<DependencyNode>,
}

impl DependencyTree {
    /// Create a tree holding just the root node.
    pub fn with_root(module_name: &str, version: &str) -> Self {
        let mut tree = Self::default();
        tree.nodes.push(DependencyNode::new(
            NodeId(0),
            module_name,
            version,
            DependencyKind::Normal,
        ));
        tree
    }

    /// The root node id, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(NodeId(0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id.0)
    }

    /// Create a normal dependency of `parent` and attach it as the last child.
    pub fn add_child(&mut self, parent: NodeId, module_name: &str, version: &str) -> NodeId {
        self.add_child_of_kind(parent, DependencyKind::Normal, module_name, version)
    }

    /// Create a dev dependency of `parent` and attach it as the last child.
    pub fn add_dev_child(&mut self, parent: NodeId, module_name: &str, version: &str) -> NodeId {
        self.add_child_of_kind(parent, DependencyKind::Dev, module_name, version)
    }

    pub fn add_child_of_kind(
        &mut self,
        parent: NodeId,
        kind: DependencyKind,
        module_name: &str,
        version: &str,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = DependencyNode::new(id, module_name, version, kind);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Record that `module_name` must be rejected wherever it sits below `when_dependency_of`.
    pub fn add_exclusion_rule(&mut self, id: NodeId, module_name: &str, when_dependency_of: &str) {
        self.nodes[id.0]
            .exclusion_rules
            .insert(module_name.to_string(), when_dependency_of.to_string());
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |p| self.nodes[p.0].parent)
    }

    /// Pre-order traversal of the subtree at `from`: the node, then each
    /// child subtree in insertion order.
    pub fn pre_order(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![from];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
            Some(id)
        })
    }

    /// True if any ancestor of `id` is named `ancestor_module_name`.
    pub fn is_dependency_of(&self, id: NodeId, ancestor_module_name: &str) -> bool {
        self.ancestors(id)
            .any(|a| self.nodes[a.0].module_name == ancestor_module_name)
    }

    /// If an ancestor of `id` has the same module name (at any version),
    /// render the path from that ancestor down to `id`.
    pub fn detect_circular_dependency(&self, id: NodeId, include_version: bool) -> Option<String> {
        let name = &self.nodes[id.0].module_name;
        let ancestor = self
            .ancestors(id)
            .find(|a| &self.nodes[a.0].module_name == name)?;

        let mut chain = vec![id];
        chain.extend(self.ancestors(id).take_while(|a| *a != ancestor));
        chain.push(ancestor);
        chain.reverse();
        Some(self.render_chain(&chain, include_version))
    }

    /// Render the chain from the root down to `id`.
    pub fn path_from_root(&self, id: NodeId, include_version: bool) -> String {
        let mut chain: Vec<NodeId> = self.ancestors(id).collect();
        chain.reverse();
        chain.push(id);
        self.render_chain(&chain, include_version)
    }

    fn render_chain(&self, chain: &[NodeId], include_version: bool) -> String {
        chain
            .iter()
            .map(|n| self.nodes[n.0].render(include_version))
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Set the rejection flag and reason on `id`, and on its whole subtree
    /// when `also_reject_descendants` is set. Safe to repeat.
    pub fn set_rejected(
        &mut self,
        id: NodeId,
        reason: RejectionReason,
        rejected: bool,
        also_reject_descendants: bool,
    ) {
        let targets: Vec<NodeId> = if also_reject_descendants {
            self.pre_order(id).collect()
        } else {
            vec![id]
        };
        for target in targets {
            let node = &mut self.nodes[target.0];
            node.rejected = rejected;
            node.reason = rejected.then_some(reason);
        }
    }

    /// False for the root.
    pub fn is_parent_rejected(&self, id: NodeId) -> bool {
        self.nodes[id.0]
            .parent
            .is_some_and(|p| self.nodes[p.0].rejected)
    }

    /// Every module name in the subtree at `from`, in pre-order, repeats included.
    pub fn collect_all_module_names(&self, from: NodeId) -> Vec<String> {
        self.pre_order(from)
            .map(|id| self.nodes[id.0].module_name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.iter()
    }
}

impl Index<NodeId> for DependencyTree {
    type Output = DependencyNode;

    fn index(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }
}
