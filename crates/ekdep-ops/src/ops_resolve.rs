//! Operation: resolve the project's dependencies.

use std::path::{Path, PathBuf};

use ekdep_core::config::GlobalConfig;
use ekdep_core::manifest::{Manifest, MANIFEST_FILE};
use ekdep_resolver::builder::GraphBuilder;
use ekdep_resolver::manager::{DependencyManager, OptimiseSummary};
use ekdep_resolver::provider::DirectoryPackageSource;
use ekdep_resolver::report::ResolutionReport;
use ekdep_util::errors::EkdepError;
use ekdep_util::progress;
use tracing::info;

/// Options for `ekdep resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Print the report as JSON instead of text.
    pub json: bool,
    /// List every rejected dependency with its path from the root.
    pub verbose: bool,
    /// Package cache to read from instead of the configured one.
    pub cache_dir: Option<PathBuf>,
    /// Concurrent fetch limit instead of the configured one.
    pub jobs: Option<usize>,
}

/// A settled dependency tree and what resolving it produced.
pub struct Resolution {
    pub manager: DependencyManager,
    pub optimise: OptimiseSummary,
    pub exclusions_applied: usize,
    /// List every accepted and rejected dependency, from `--verbose` or
    /// `[resolve] verbose` in the global config.
    pub verbose: bool,
}

/// Build the graph and run every resolution pass.
///
/// Fails on an invalid manifest, provider failures and circular
/// dependencies. Version breaches are left in the result for the caller.
pub async fn resolve_graph(project_root: &Path, opts: &ResolveOptions) -> miette::Result<Resolution> {
    let manifest = Manifest::from_path(&project_root.join(MANIFEST_FILE))?;
    let config = GlobalConfig::load()?;
    let cache_dir = opts.cache_dir.clone().unwrap_or_else(|| config.cache_dir());
    let jobs = opts.jobs.unwrap_or(config.resolve.jobs);
    let verbose = opts.verbose || config.resolve.verbose;
    let root = manifest.to_metadata();

    info!(cache = %cache_dir.display(), jobs, "resolving {}", root.vector_text());

    let sp = (!opts.json).then(|| progress::spinner("Resolving dependencies..."));
    let built = GraphBuilder::new(DirectoryPackageSource::new(cache_dir))
        .jobs(jobs)
        .build(&root)
        .await;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }
    let mut manager = built?;

    let circulars = manager.report_circular_dependencies(true);
    if !circulars.is_empty() {
        return Err(EkdepError::Resolution {
            message: format!("circular dependencies: {}", circulars.join("; ")),
        }
        .into());
    }

    let exclusions_applied = manager.apply_exclusions();
    manager.rationalise();
    let optimise = manager.optimise_until_stable();

    Ok(Resolution {
        manager,
        optimise,
        exclusions_applied,
        verbose,
    })
}

/// Resolve, print the report, and fail when the result blocks the build.
pub async fn resolve(project_root: &Path, opts: &ResolveOptions) -> miette::Result<ResolutionReport> {
    let resolution = resolve_graph(project_root, opts).await?;
    let report = ResolutionReport::from_manager(&resolution.manager, resolution.optimise.passes);

    if opts.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| EkdepError::Generic {
            message: format!("Failed to serialize report: {e}"),
        })?;
        println!("{json}");
    } else {
        if resolution.verbose {
            for rejected in &report.rejected {
                progress::status_warn("Rejected", &rejected.path);
            }
            for accepted in &report.accepted {
                progress::status("Accepted", accepted);
            }
        }
        for breach in &report.breaches {
            progress::status_error("Breach", breach);
        }
        progress::status(
            "Resolved",
            &format!(
                "{} ({} accepted, {} rejected, {} exclusion rules)",
                report.root,
                report.accepted.len(),
                report.rejected.len(),
                resolution.exclusions_applied
            ),
        );
    }

    if !report.breaches.is_empty() {
        return Err(EkdepError::Resolution {
            message: format!(
                "semantic version breaches: {}; exclude the higher major version or upgrade the dependents",
                report.breaches.join(", ")
            ),
        }
        .into());
    }
    Ok(report)
}
