//! Handler for `ekdep tree`.

use miette::Result;

use ekdep_ops::ops_resolve::ResolveOptions;
use ekdep_ops::ops_tree::{self, TreeOptions};

pub async fn exec(
    depth: Option<usize>,
    accepted: bool,
    why: Option<String>,
    resolve: ResolveOptions,
) -> Result<()> {
    let project_root = super::project_root()?;
    let opts = TreeOptions {
        depth,
        accepted,
        why,
        resolve,
    };
    ops_tree::tree(&project_root, &opts).await
}
