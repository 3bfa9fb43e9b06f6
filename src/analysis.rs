use tracing::info;

use crate::deps::Registry;
use crate::project::references::ReferenceExtractor;
use crate::project::{Project, SourceSite};

/// The result of one full analysis pass over a project.
pub struct Analysis {
    pub registry: Registry<SourceSite>,
    /// Number of packages scanned (packages owning at least one source file).
    pub packages_scanned: usize,
    /// Number of observed cross-package references fed to the registry.
    pub references: usize,
}

/// Run one analysis pass: scan every package with source files, then record
/// every observed reference.
///
/// All scans complete before the first use is recorded, so every observed
/// edge can be matched against its package's declared edges.
pub fn analyze(project: &Project) -> anyhow::Result<Analysis> {
    let extractor = ReferenceExtractor::new(&project.config.references)?;
    let mut registry = Registry::new();

    let mut packages_scanned = 0;
    for package in project.source_packages() {
        registry.scan(project, &package.name);
        packages_scanned += 1;
    }

    let references = project.collect_references(&extractor);
    for reference in &references {
        registry.record_use(reference.site.clone(), &reference.source, &reference.target);
    }

    info!(
        packages = packages_scanned,
        references = references.len(),
        edges = registry.edges().len(),
        "analysis complete"
    );

    Ok(Analysis {
        registry,
        packages_scanned,
        references: references.len(),
    })
}
