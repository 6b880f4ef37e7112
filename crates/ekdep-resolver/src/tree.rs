//! Text rendering of a dependency tree.

use crate::node::{DependencyKind, DependencyTree, NodeId};

/// Render the tree as box-drawing text.
///
/// The root's direct dependencies are grouped under `[dependencies]` and
/// `[dev-dependencies]` headers when any dev dependencies are present.
/// Rejected nodes carry their reason, e.g. `lib-1.0.0-0 (RATIONALISATION)`;
/// with `accepted_only` they are left out along with everything below them.
pub fn render_tree(tree: &DependencyTree, max_depth: Option<usize>, accepted_only: bool) -> String {
    let mut output = String::new();
    let Some(root) = tree.root() else {
        return output;
    };
    output.push_str(&format!("{}\n", tree[root]));

    let visible = |id: &NodeId| !accepted_only || !tree[*id].is_rejected();
    let (normal, dev): (Vec<NodeId>, Vec<NodeId>) = tree[root]
        .children()
        .iter()
        .copied()
        .filter(visible)
        .partition(|id| tree[*id].kind() == DependencyKind::Normal);

    let show_headers = !dev.is_empty();
    let sections: Vec<(&str, Vec<NodeId>)> = [("[dependencies]", normal), ("[dev-dependencies]", dev)]
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
        .collect();
    let total_sections = sections.len();

    for (section, (label, ids)) in sections.into_iter().enumerate() {
        if show_headers {
            output.push_str(&format!("{label}\n"));
        }
        let is_last_section = section + 1 == total_sections;
        let count = ids.len();
        for (i, id) in ids.into_iter().enumerate() {
            let is_last = i + 1 == count && is_last_section;
            render_subtree(tree, &mut output, id, "", is_last, 1, max_depth, accepted_only);
        }
    }

    output
}

#[allow(clippy::too_many_arguments)]
fn render_subtree(
    tree: &DependencyTree,
    output: &mut String,
    id: NodeId,
    prefix: &str,
    is_last: bool,
    depth: usize,
    max_depth: Option<usize>,
    accepted_only: bool,
) {
    let connector = if is_last { "└── " } else { "├── " };
    output.push_str(&format!("{prefix}{connector}{}\n", tree[id]));

    if max_depth.is_some_and(|max| depth >= max) {
        return;
    }

    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    let children: Vec<NodeId> = tree[id]
        .children()
        .iter()
        .copied()
        .filter(|c| !accepted_only || !tree[*c].is_rejected())
        .collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_subtree(
            tree,
            output,
            child,
            &child_prefix,
            i + 1 == count,
            depth + 1,
            max_depth,
            accepted_only,
        );
    }
}
