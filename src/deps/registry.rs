use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::resolver::{DirectiveResolver, PackageIndex};
use super::{DependencyEdge, DependencyKind};

/// Every dependency discovered during one analysis run, classified.
///
/// Construct one registry per run. [`Registry::scan`] must run for a package
/// before any [`Registry::record_use`] whose source (or expected allowed
/// target) is that package; an edge observed first is classified as
/// `Forbidden`/`Inferred` because there is no declared edge to reuse.
#[derive(Debug)]
pub struct Registry<S> {
    edges: Vec<DependencyEdge<S>>,
    /// source -> target -> position in `edges`, for reusable edges only.
    index: HashMap<String, HashMap<String, usize>>,
    directive_less: BTreeSet<String>,
    scanned: BTreeSet<String>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            index: HashMap::new(),
            directive_less: BTreeSet::new(),
            scanned: BTreeSet::new(),
        }
    }

    /// Seed the edges declared for `source` by its own and its ancestors' directives.
    ///
    /// A package without any directive in its chain is remembered as
    /// directive-less and gets no edges. Scanning the same package twice
    /// inserts its declared edges twice.
    pub fn scan<I: PackageIndex + ?Sized>(&mut self, index: &I, source: &str) {
        if !self.scanned.insert(source.to_owned()) {
            debug!(package = source, "package scanned more than once");
        }

        let resolution = DirectiveResolver::new(index).resolve(source);

        let Some(all) = &resolution.all else {
            debug!(package = source, "no dependency directive in ancestor chain");
            self.directive_less.insert(source.to_owned());
            return;
        };

        for target in all {
            let kind = if target == source {
                DependencyKind::Cycle
            } else if resolution.is_primary(target) {
                DependencyKind::Primary
            } else {
                DependencyKind::Secondary
            };
            self.push(DependencyEdge::declared(source, target, kind));
        }

        for invalid in &resolution.invalid {
            self.push(DependencyEdge::declared(
                &invalid.declared_by,
                &invalid.target,
                DependencyKind::Invalid,
            ));
        }

        debug!(
            package = source,
            allowed = all.len(),
            invalid = resolution.invalid.len(),
            "scanned dependency directive"
        );
    }

    /// Record an observed dependency of `source` on `target`.
    ///
    /// Reuses the existing edge for the pair if there is one (marking it used,
    /// keeping its kind and origin). Otherwise creates an `Inferred` edge for a
    /// directive-less source, or a `Forbidden` edge, carrying `origin`.
    pub fn record_use(&mut self, origin: S, source: &str, target: &str) -> &DependencyEdge<S> {
        let by_target = self.index.entry(source.to_owned()).or_default();
        let position = match by_target.entry(target.to_owned()) {
            Entry::Occupied(slot) => {
                let position = *slot.get();
                self.edges[position].used = true;
                position
            }
            Entry::Vacant(slot) => {
                let kind = if self.directive_less.contains(source) {
                    DependencyKind::Inferred
                } else {
                    DependencyKind::Forbidden
                };
                let position = self.edges.len();
                slot.insert(position);
                self.edges
                    .push(DependencyEdge::observed(origin, source, target, kind));
                position
            }
        };
        &self.edges[position]
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[DependencyEdge<S>] {
        &self.edges
    }

    /// Packages that had no directive anywhere in their ancestor chain.
    pub fn directive_less(&self) -> &BTreeSet<String> {
        &self.directive_less
    }

    /// Declared `Primary`/`Secondary` edges that no observed use matched.
    pub fn unused(&self) -> impl Iterator<Item = &DependencyEdge<S>> {
        self.edges.iter().filter(|edge| {
            !edge.used
                && matches!(
                    edge.kind(),
                    DependencyKind::Primary | DependencyKind::Secondary
                )
        })
    }

    pub fn count_by_kind(&self) -> BTreeMap<DependencyKind, usize> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.kind()).or_insert(0) += 1;
        }
        counts
    }

    fn push(&mut self, edge: DependencyEdge<S>) {
        if edge.kind().is_reusable() {
            let position = self.edges.len();
            self.index
                .entry(edge.source.clone())
                .or_default()
                .entry(edge.target.clone())
                .or_insert(position);
        }
        self.edges.push(edge);
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
