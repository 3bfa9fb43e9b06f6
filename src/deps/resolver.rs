use std::collections::BTreeSet;

use serde::Serialize;

/// Package existence and directive lookup, supplied by the traversal layer.
pub trait PackageIndex {
    /// Resolve `name` to the fully-qualified name of an existing package.
    fn resolve_package(&self, name: &str) -> Option<String>;

    /// The declared allow-list of `package`, in declaration order.
    ///
    /// `None` means the package carries no directive at all, which is not the
    /// same as a directive that declares zero targets.
    fn read_directive(&self, package: &str) -> Option<&[String]>;
}

/// A declared target that does not resolve to an existing package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidTarget {
    /// The package whose directive declares the target (the package itself or an ancestor).
    pub declared_by: String,
    /// The target name exactly as declared (trimmed).
    pub target: String,
}

/// The effective allow-list of one package.
#[derive(Debug, Clone, Default)]
pub struct AllowListResolution {
    /// Every resolved target allowed by the package or any ancestor.
    /// `None` if no directive exists anywhere in the ancestor chain.
    pub all: Option<BTreeSet<String>>,
    /// Targets contributed by the package's own directive.
    /// `None` if the package itself has no directive.
    pub primary: Option<BTreeSet<String>>,
    /// Declared targets that did not resolve, in walk order.
    pub invalid: Vec<InvalidTarget>,
}

impl AllowListResolution {
    /// Whether any directive was found in the ancestor chain.
    pub fn has_directive(&self) -> bool {
        self.all.is_some()
    }

    pub fn is_primary(&self, target: &str) -> bool {
        self.primary
            .as_ref()
            .is_some_and(|primary| primary.contains(target))
    }

    /// Targets allowed only through an ancestor's directive.
    pub fn secondary(&self) -> BTreeSet<String> {
        match &self.all {
            Some(all) => all
                .iter()
                .filter(|target| !self.is_primary(target))
                .cloned()
                .collect(),
            None => BTreeSet::new(),
        }
    }
}

/// Computes [`AllowListResolution`]s by walking the package hierarchy.
pub struct DirectiveResolver<'a, I: ?Sized> {
    index: &'a I,
}

impl<'a, I: PackageIndex + ?Sized> DirectiveResolver<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self { index }
    }

    /// Resolve the effective allow-list of `source`.
    ///
    /// The package's own directive is read first and snapshotted as `primary`;
    /// the ancestors are merged into `all` afterwards.
    pub fn resolve(&self, source: &str) -> AllowListResolution {
        let mut resolution = AllowListResolution::default();

        self.merge_directive(source, &mut resolution);
        resolution.primary = resolution.all.clone();

        for ancestor in ancestors(source) {
            self.merge_directive(ancestor, &mut resolution);
        }

        resolution
    }

    /// Merge the directive declared on `package` (if any) into `resolution`.
    fn merge_directive(&self, package: &str, resolution: &mut AllowListResolution) {
        let Some(qualified) = self.index.resolve_package(package) else {
            return;
        };
        let Some(declared) = self.index.read_directive(&qualified) else {
            return;
        };

        let all = resolution.all.get_or_insert_with(BTreeSet::new);
        for target in declared.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            match self.index.resolve_package(target) {
                Some(resolved) => {
                    all.insert(resolved);
                }
                None => resolution.invalid.push(InvalidTarget {
                    declared_by: qualified.clone(),
                    target: target.to_owned(),
                }),
            }
        }
    }
}

/// Proper ancestors of a dot-separated package name, nearest first:
/// `a.b.c` yields `a.b`, then `a`.
pub fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    let mut current = name;
    std::iter::from_fn(move || {
        let idx = current.rfind('.')?;
        current = &current[..idx];
        Some(current)
    })
}
