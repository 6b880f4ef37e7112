//! Handler for `ekdep resolve`.

use miette::Result;

use ekdep_ops::ops_resolve::{self, ResolveOptions};

pub async fn exec(opts: ResolveOptions) -> Result<()> {
    let project_root = super::project_root()?;
    ops_resolve::resolve(&project_root, &opts).await.map(|_| ())
}
