use std::collections::BTreeSet;

use serde::Serialize;

use crate::deps::resolver::ancestors;
use crate::deps::{DependencyEdge, DependencyKind, Registry};
use crate::project::{Project, SourceSite};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A located message about one dependency edge or package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Diagnostic {
    /// `None` only when the package has no file to point at.
    pub site: Option<SourceSite>,
    pub severity: Severity,
    pub message: String,
}

/// Turn a finished analysis into diagnostics, deduplicated and sorted by location.
pub fn collect(registry: &Registry<SourceSite>, project: &Project) -> Vec<Diagnostic> {
    let report_inherited = project.config.report_unused_inherited;
    let mut out: BTreeSet<Diagnostic> = registry
        .edges()
        .iter()
        .filter_map(|edge| edge_diagnostic(edge, project, report_inherited))
        .collect();

    for package in registry.directive_less() {
        out.insert(Diagnostic {
            site: project.package(package).and_then(|p| p.declaration_site()),
            severity: Severity::Warning,
            message: "no dependency directive".to_owned(),
        });
    }

    out.into_iter().collect()
}

fn edge_diagnostic(
    edge: &DependencyEdge<SourceSite>,
    project: &Project,
    report_inherited: bool,
) -> Option<Diagnostic> {
    let (severity, site, message) = match edge.kind() {
        DependencyKind::Invalid => (
            Severity::Error,
            project.directive_site(&edge.source, &edge.target),
            format!("Invalid dependency directive: unknown package [{}]", edge.target),
        ),
        DependencyKind::Cycle => (
            Severity::Error,
            declaring_site(project, &edge.source, &edge.target),
            format!("Cyclic dependency declared on [{}]", edge.source),
        ),
        DependencyKind::Forbidden => (
            Severity::Error,
            edge.origin.clone(),
            format!("Forbidden dependency on [{}]", edge.target),
        ),
        DependencyKind::Primary if !edge.used => (
            Severity::Warning,
            project.directive_site(&edge.source, &edge.target),
            format!("Unused dependency on [{}]", edge.target),
        ),
        DependencyKind::Secondary if !edge.used && report_inherited => (
            Severity::Warning,
            declaring_site(project, &edge.source, &edge.target),
            format!("Unused dependency on [{}]", edge.target),
        ),
        DependencyKind::Primary | DependencyKind::Secondary | DependencyKind::Inferred => {
            return None;
        }
    };
    Some(Diagnostic {
        site,
        severity,
        message,
    })
}

/// The directive entry declaring `target` in `package` itself or its nearest ancestor.
fn declaring_site(project: &Project, package: &str, target: &str) -> Option<SourceSite> {
    std::iter::once(package).chain(ancestors(package)).find_map(|declarer| {
        let directive = project.package(declarer)?.directive.as_ref()?;
        directive
            .targets()
            .iter()
            .any(|t| t.trim() == target)
            .then(|| directive.site_of(target))
    })
}

/// Number of diagnostics of the given severity.
pub fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
