use std::collections::BTreeMap;

use serde::Serialize;

use crate::deps::DependencyKind;

/// Aggregate statistics produced by a `check` run.
#[derive(Debug, Serialize)]
pub struct CheckStats {
    /// Packages discovered in the tree (with or without source files).
    pub packages: usize,
    /// Packages analysed (owning at least one source file).
    pub packages_scanned: usize,
    /// Observed cross-package references.
    pub references: usize,
    /// Classified edges per kind.
    pub edges: BTreeMap<DependencyKind, usize>,
    /// Packages without any directive in their ancestor chain.
    pub directive_less: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Wall-clock time for the run in seconds.
    pub elapsed_secs: f64,
}

/// Print a summary of the check run.
///
/// Written to **stderr** so that stdout stays clean for downstream consumers
/// of the diagnostics themselves.
pub fn print_summary(stats: &CheckStats) {
    eprintln!(
        "Checked {} of {} packages ({} references) in {:.2}s",
        stats.packages_scanned, stats.packages, stats.references, stats.elapsed_secs
    );

    let kinds: Vec<String> = DependencyKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "{} {}",
                stats.edges.get(kind).copied().unwrap_or(0),
                kind.as_str()
            )
        })
        .collect();
    eprintln!("  edges: {}", kinds.join(", "));

    if stats.directive_less > 0 {
        eprintln!(
            "  {} package(s) without a dependency directive",
            stats.directive_less
        );
    }
    eprintln!("  {} error(s), {} warning(s)", stats.errors, stats.warnings);
}
