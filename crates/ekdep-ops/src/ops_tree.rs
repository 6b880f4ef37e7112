//! Operation: display the dependency tree.

use std::path::Path;

use ekdep_resolver::tree::render_tree;
use ekdep_util::progress;

use crate::ops_resolve::{resolve_graph, Resolution, ResolveOptions};

/// Options for `ekdep tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Hide rejected dependencies.
    pub accepted: bool,
    /// Show every path from the root to this module instead of the tree.
    pub why: Option<String>,
    pub resolve: ResolveOptions,
}

/// Render the settled tree, or the paths to one module for `--why`.
pub fn render(resolution: &Resolution, opts: &TreeOptions) -> String {
    let manager = &resolution.manager;
    let Some(module) = &opts.why else {
        return render_tree(manager.tree(), opts.depth, opts.accepted);
    };

    let paths: Vec<String> = manager
        .find_by_module_name(module)
        .iter()
        .filter(|n| !opts.accepted || !n.is_rejected())
        .map(|n| manager.tree().path_from_root(n.id(), true))
        .collect();
    if paths.is_empty() {
        format!("Dependency '{module}' not found in the graph.\n")
    } else {
        let mut output = format!("Paths to {module}:\n");
        for path in paths {
            output.push_str(&format!("  {path}\n"));
        }
        output
    }
}

/// Display the dependency tree for the project.
pub async fn tree(project_root: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let resolution = resolve_graph(project_root, &opts.resolve).await?;
    print!("{}", render(&resolution, opts));

    for breach in resolution.manager.report_strict_semantic_version_breaches() {
        progress::status_error("Breach", &breach.to_string());
    }
    Ok(())
}
