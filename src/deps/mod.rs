pub mod registry;
pub mod resolver;

use serde::Serialize;

pub use registry::Registry;
pub use resolver::{AllowListResolution, DirectiveResolver, PackageIndex};

/// Classification of a package-to-package dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Allowed by the package's own directive.
    Primary,
    /// Allowed by the directive of an ancestor package.
    Secondary,
    /// Declared in a directive, but the target package doesn't exist.
    Invalid,
    /// Observed, but not covered by the package's (possibly inherited) directive.
    Forbidden,
    /// Observed from a package without any directive in its ancestor chain.
    Inferred,
    /// The package depends on itself.
    Cycle,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 6] = [
        DependencyKind::Primary,
        DependencyKind::Secondary,
        DependencyKind::Invalid,
        DependencyKind::Forbidden,
        DependencyKind::Inferred,
        DependencyKind::Cycle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DependencyKind::Primary => "primary",
            DependencyKind::Secondary => "secondary",
            DependencyKind::Invalid => "invalid",
            DependencyKind::Forbidden => "forbidden",
            DependencyKind::Inferred => "inferred",
            DependencyKind::Cycle => "cycle",
        }
    }

    /// Parse a lowercase kind name as accepted by `--kind`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name.trim().to_ascii_lowercase())
    }

    /// Whether an observed use may be matched against an edge of this kind.
    pub(crate) fn is_reusable(self) -> bool {
        !matches!(self, DependencyKind::Invalid)
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified dependency of `source` on `target`.
///
/// `S` is the caller's handle to the place in the source code where the
/// dependency was observed. It is only present for edges created from an
/// observed use; edges seeded from a directive carry none.
#[derive(Debug, Clone)]
pub struct DependencyEdge<S> {
    pub source: String,
    pub target: String,
    kind: DependencyKind,
    pub origin: Option<S>,
    pub used: bool,
}

impl<S> DependencyEdge<S> {
    pub(crate) fn declared(source: &str, target: &str, kind: DependencyKind) -> Self {
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            origin: None,
            used: false,
        }
    }

    pub(crate) fn observed(origin: S, source: &str, target: &str, kind: DependencyKind) -> Self {
        Self {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            origin: Some(origin),
            used: true,
        }
    }

    /// The classification assigned when the edge was created. It never changes.
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }
}
