//! Builds the dependency tree for a root package by querying a [`PackageSource`].
//!
//! The tree is expanded depth first with an explicit stack. When a node is
//! expanded, metadata for all of its declared dependencies is fetched in
//! parallel, bounded by a semaphore. Children are then attached one at a
//! time in declaration order (`deps` before `dev_deps`), checked for
//! circularity as soon as they are attached, and fully expanded before the
//! next sibling. A fetch failure only surfaces when its dependency is
//! reached in that order, so the error reported is the one a sequential
//! walk would hit first.

use std::collections::HashMap;
use std::sync::Arc;

use ekdep_core::package::PackageMetadata;
use ekdep_core::vector::DependencyVector;
use ekdep_core::version::SemanticVersion;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{ProviderError, ResolveError};
use crate::manager::DependencyManager;
use crate::node::{DependencyKind, DependencyTree, NodeId};
use crate::provider::PackageSource;

/// Default number of concurrent metadata fetches.
pub const DEFAULT_JOBS: usize = 8;

type FetchResult = Result<PackageMetadata, ProviderError>;

/// A node on the build stack and the declared dependencies it has yet to attach.
struct Frame {
    node: NodeId,
    metadata: PackageMetadata,
    pending: std::vec::IntoIter<(DependencyKind, String, String)>,
}

/// Constructs a [`DependencyManager`] over a fully resolved tree.
pub struct GraphBuilder<S> {
    source: Arc<S>,
    jobs: usize,
}

impl<S: PackageSource + 'static> GraphBuilder<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self {
            source,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Limit concurrent fetches. Zero is treated as one.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Build the tree rooted at `root`.
    ///
    /// Fails on the first invalid version, provider failure or circular
    /// dependency; nothing is returned for a partially built tree.
    pub async fn build(&self, root: &PackageMetadata) -> Result<DependencyManager, ResolveError> {
        validate_version(&root.module_name, &root.version)?;

        let mut tree = DependencyTree::with_root(&root.module_name, &root.version);
        let mut fetched: HashMap<String, FetchResult> = HashMap::new();
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(id) = tree.root() {
            stack.push(self.expand(id, root.clone(), &mut fetched).await?);
        }

        while let Some(frame) = stack.last_mut() {
            let parent = frame.node;
            let Some((kind, module, version)) = frame.pending.next() else {
                // Every child attached cleanly: record this node's exclusions.
                if let Some(done) = stack.pop() {
                    for (module, ancestor) in &done.metadata.exclude_deps {
                        tree.add_exclusion_rule(done.node, module, ancestor);
                    }
                }
                continue;
            };

            let version = validate_version(&module, &version)?;
            let key = DependencyVector::new(module, version).to_string();
            let metadata = match fetched.get(&key) {
                Some(Ok(metadata)) => metadata.clone(),
                Some(Err(_)) | None => return Err(take_failure(&mut fetched, key).into()),
            };
            validate_version(&metadata.module_name, &metadata.version)?;

            let child = tree.add_child_of_kind(parent, kind, &metadata.module_name, &metadata.version);
            if let Some(path) = tree.detect_circular_dependency(child, true) {
                return Err(ResolveError::CircularDependency { path });
            }
            debug!(depth = stack.len(), vector = %key, "attached dependency");
            stack.push(self.expand(child, metadata, &mut fetched).await?);
        }

        info!(
            root = %root.vector_text(),
            nodes = tree.len(),
            "dependency graph built"
        );
        Ok(DependencyManager::new(tree))
    }

    /// Prefetch the declared dependencies of `node` and queue them for attaching.
    async fn expand(
        &self,
        node: NodeId,
        metadata: PackageMetadata,
        fetched: &mut HashMap<String, FetchResult>,
    ) -> Result<Frame, ResolveError> {
        let declared: Vec<(DependencyKind, String, String)> = metadata
            .deps
            .iter()
            .map(|(m, v)| (DependencyKind::Normal, m.clone(), v.clone()))
            .chain(
                metadata
                    .dev_deps
                    .iter()
                    .map(|(m, v)| (DependencyKind::Dev, m.clone(), v.clone())),
            )
            .collect();

        // Invalid versions are left for the attach loop to report in order.
        let vectors: Vec<DependencyVector> = declared
            .iter()
            .filter_map(|(_, module, version)| {
                let parsed = SemanticVersion::parse(version);
                parsed
                    .is_valid()
                    .then(|| DependencyVector::new(module.clone(), parsed))
            })
            .collect();
        self.prefetch(vectors, fetched).await?;

        Ok(Frame {
            node,
            metadata,
            pending: declared.into_iter(),
        })
    }

    /// Fetch metadata for every vector not already in `fetched`.
    async fn prefetch(
        &self,
        vectors: Vec<DependencyVector>,
        fetched: &mut HashMap<String, FetchResult>,
    ) -> Result<(), ResolveError> {
        let mut pending: Vec<DependencyVector> = Vec::new();
        for vector in vectors {
            let key = vector.to_string();
            if !fetched.contains_key(&key) && !pending.iter().any(|v| v.to_string() == key) {
                pending.push(vector);
            }
        }
        if pending.is_empty() {
            return Ok(());
        }

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut join_set = JoinSet::new();
        for vector in pending {
            let source = Arc::clone(&self.source);
            let sem = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = sem.acquire().await;
                let result = source.resolve(&vector).await;
                (vector.to_string(), result)
            });
        }
        while let Some(joined) = join_set.join_next().await {
            let (key, result) = joined?;
            if let Err(e) = &result {
                debug!(vector = %key, error = %e, "package fetch failed");
            }
            fetched.insert(key, result);
        }
        Ok(())
    }
}

/// Build the dependency graph for `root` with default settings.
pub async fn build_graph<S: PackageSource + 'static>(
    root: &PackageMetadata,
    source: S,
) -> Result<DependencyManager, ResolveError> {
    GraphBuilder::new(source).build(root).await
}

fn validate_version(module: &str, version: &str) -> Result<SemanticVersion, ResolveError> {
    let parsed = SemanticVersion::parse(version);
    if parsed.is_valid() {
        Ok(parsed)
    } else {
        Err(ResolveError::InvalidVersion {
            module: module.to_string(),
            version: version.to_string(),
        })
    }
}

/// Remove and return the stored failure for `key`.
fn take_failure(fetched: &mut HashMap<String, FetchResult>, key: String) -> ProviderError {
    match fetched.remove(&key) {
        Some(Err(e)) => e,
        _ => ProviderError::NotFound { vector: key },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::node::RejectionReason;
    use crate::provider::MemoryPackageSource;

    fn pkg(name: &str, version: &str) -> PackageMetadata {
        PackageMetadata::new(name, version)
    }

    #[tokio::test]
    async fn builds_tree_in_declaration_order() {
        let root = pkg("app", "1.0.0-0")
            .with_dev_dep("test.kit", "1.0.0-0")
            .with_dep("b", "1.0.0-0")
            .with_dep("c", "1.0.0-0");
        let source = MemoryPackageSource::new()
            .with(pkg("b", "1.0.0-0").with_dep("d", "2.0.0-0"))
            .with(pkg("c", "1.0.0-0").with_dep("d", "2.1.0-0"))
            .with(pkg("d", "2.0.0-0"))
            .with(pkg("d", "2.1.0-0"))
            .with(pkg("test.kit", "1.0.0-0"));

        let manager = build_graph(&root, source).await.unwrap();
        assert_eq!(
            manager.report_all_dependencies(),
            ["app", "b", "d", "c", "d", "test.kit"]
        );
        let tree = manager.tree();
        let root_id = tree.root().unwrap();
        let kinds: Vec<DependencyKind> = tree[root_id]
            .children()
            .iter()
            .map(|id| tree[*id].kind())
            .collect();
        assert_eq!(
            kinds,
            [DependencyKind::Normal, DependencyKind::Normal, DependencyKind::Dev]
        );
    }

    #[tokio::test]
    async fn circular_dependency_aborts_with_path() {
        let root = pkg("A", "1.0.0-0").with_dep("B", "1.0.0-0");
        let source = MemoryPackageSource::new()
            .with(pkg("B", "1.0.0-0").with_dep("A", "1.0.0-0"))
            .with(pkg("A", "1.0.0-0").with_dep("B", "1.0.0-0"));

        let err = build_graph(&root, source).await.unwrap_err();
        match err {
            ResolveError::CircularDependency { path } => {
                assert_eq!(path, "A-1.0.0-0 ~> B-1.0.0-0 ~> A-1.0.0-0");
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn circularity_ignores_version() {
        let root = pkg("A", "1.0.0-0").with_dep("B", "1.0.0-0");
        let source = MemoryPackageSource::new()
            .with(pkg("B", "1.0.0-0").with_dep("A", "0.9.0-3"))
            .with(pkg("A", "0.9.0-3"));
        let err = build_graph(&root, source).await.unwrap_err();
        assert!(matches!(err, ResolveError::CircularDependency { .. }));
    }

    #[tokio::test]
    async fn provider_failure_aborts_build() {
        let root = pkg("app", "1.0.0-0")
            .with_dep("present", "1.0.0-0")
            .with_dep("missing", "1.0.0-0");
        let source = MemoryPackageSource::new().with(pkg("present", "1.0.0-0"));
        let err = build_graph(&root, source).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Provider(ProviderError::NotFound { ref vector }) if vector == "missing-1.0.0-0"
        ));
    }

    #[tokio::test]
    async fn earlier_branch_is_finished_before_later_sibling() {
        // b loops back to the root; c is missing. b's subtree is walked
        // first, so the circular dependency is what stops the build.
        let root = pkg("app", "1.0.0-0")
            .with_dep("b", "1.0.0-0")
            .with_dep("c", "1.0.0-0");
        let source = MemoryPackageSource::new()
            .with(pkg("b", "1.0.0-0").with_dep("app", "1.0.0-0"))
            .with(pkg("app", "1.0.0-0"));

        let err = build_graph(&root, source).await.unwrap_err();
        match err {
            ResolveError::CircularDependency { path } => {
                assert_eq!(path, "app-1.0.0-0 ~> b-1.0.0-0 ~> app-1.0.0-0");
            }
            other => panic!("expected circular dependency, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deep_chain_is_built_before_next_sibling() {
        let root = pkg("app", "1.0.0-0")
            .with_dep("a", "1.0.0-0")
            .with_dep("z", "1.0.0-0");
        let source = MemoryPackageSource::new()
            .with(pkg("a", "1.0.0-0").with_dep("b", "1.0.0-0"))
            .with(pkg("b", "1.0.0-0").with_dep("c", "1.0.0-0"))
            .with(pkg("c", "1.0.0-0").with_dep("bad", "one"))
            .with(pkg("z", "1.0.0-0").with_dep("gone", "1.0.0-0"));

        let err = build_graph(&root, source).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::InvalidVersion { ref module, .. } if module == "bad"
        ));
    }

    #[tokio::test]
    async fn invalid_versions_are_rejected() {
        let root = pkg("app", "1.0");
        let err = build_graph(&root, MemoryPackageSource::new()).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidVersion { ref module, .. } if module == "app"));

        let root = pkg("app", "1.0.0-0").with_dep("lib", "latest");
        let err = build_graph(&root, MemoryPackageSource::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::InvalidVersion { ref module, ref version } if module == "lib" && version == "latest"
        ));
    }

    #[tokio::test]
    async fn exclusion_rules_are_recorded_per_node() {
        let root = pkg("a.b.c", "1.0.0-0")
            .with_dep("a.b.e", "1.0.0-0")
            .with_dep("a.b.f", "1.0.0-0")
            .with_exclusion("a.b.f", "a.z.e");
        let source = MemoryPackageSource::new()
            .with(pkg("a.b.e", "1.0.0-0").with_dep("a.z.e", "1.0.0-0"))
            .with(pkg("a.z.e", "1.0.0-0").with_dep("a.b.f", "1.2.0-40"))
            .with(pkg("a.b.f", "1.0.0-0"))
            .with(pkg("a.b.f", "1.2.0-40"));

        let mut manager = build_graph(&root, source).await.unwrap();
        assert_eq!(
            manager.exclusion_rules(),
            [("a.b.f".to_string(), "a.z.e".to_string())]
        );
        manager.apply_exclusions();
        let found = manager.find_by_module_name("a.b.f");
        assert_eq!(found[0].reason(), Some(RejectionReason::Manual));
        assert!(!found[1].is_rejected());
    }

    #[tokio::test]
    async fn shared_dependencies_are_fetched_once() {
        struct Counting {
            inner: MemoryPackageSource,
            calls: AtomicUsize,
        }

        impl PackageSource for Counting {
            async fn resolve(&self, vector: &DependencyVector) -> FetchResult {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.inner.resolve(vector).await
            }
        }

        let root = pkg("app", "1.0.0-0")
            .with_dep("x", "1.0.0-0")
            .with_dep("y", "1.0.0-0");
        let inner = MemoryPackageSource::new()
            .with(pkg("x", "1.0.0-0").with_dep("shared", "1.0.0-0"))
            .with(pkg("y", "1.0.0-0").with_dep("shared", "1.0.0-0"))
            .with(pkg("shared", "1.0.0-0"));
        let source = Arc::new(Counting {
            inner,
            calls: AtomicUsize::new(0),
        });

        let manager = GraphBuilder::from_arc(Arc::clone(&source))
            .jobs(2)
            .build(&root)
            .await
            .unwrap();
        assert_eq!(manager.report_all_dependencies().len(), 5);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn root_without_dependencies() {
        let manager = build_graph(&pkg("solo", "0.1.0-0"), MemoryPackageSource::new())
            .await
            .unwrap();
        assert_eq!(manager.tree().len(), 1);
        assert!(manager.report_circular_dependencies(true).is_empty());
    }
}
