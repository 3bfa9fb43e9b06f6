pub mod directive;
pub mod references;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::FenceConfig;
use crate::deps::PackageIndex;
use crate::walker::walk_project;

use directive::{Directive, read_directive};

/// A location in the analysed tree: file plus 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceSite {
    pub file: PathBuf,
    pub line: usize,
    pub col: usize,
}

impl SourceSite {
    pub fn new(file: &Path, line: usize, col: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            line,
            col,
        }
    }

    /// The same site with its file shown relative to `root` when possible.
    pub fn relative_to(&self, root: &Path) -> SourceSite {
        let file = self.file.strip_prefix(root).unwrap_or(&self.file);
        SourceSite::new(file, self.line, self.col)
    }
}

impl std::fmt::Display for SourceSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.col)
    }
}

/// A package discovered in the tree.
#[derive(Debug, Default)]
pub struct Package {
    pub name: String,
    /// Source files belonging to the package, sorted.
    pub sources: Vec<PathBuf>,
    /// The directive file, if one exists (it may still declare nothing).
    pub directive_file: Option<PathBuf>,
    /// The parsed allow-list, if the directive file declares one.
    pub directive: Option<Directive>,
}

impl Package {
    /// Where the package is declared: its directive file, else its first source file.
    pub fn declaration_site(&self) -> Option<SourceSite> {
        self.directive_file
            .as_ref()
            .or_else(|| self.sources.first())
            .map(|file| SourceSite::new(file, 1, 1))
    }
}

/// The package model of a project tree.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: FenceConfig,
    packages: BTreeMap<String, Package>,
    externals: BTreeSet<String>,
    ignore_targets: Vec<glob::Pattern>,
}

impl Project {
    /// Discover every package under `root` using `depfence.toml` from that root.
    pub fn load(root: &Path, verbose: bool) -> anyhow::Result<Self> {
        let config = FenceConfig::load(root);
        Self::load_with(root, config, verbose)
    }

    pub fn load_with(root: &Path, config: FenceConfig, verbose: bool) -> anyhow::Result<Self> {
        let files = walk_project(root, &config, verbose)?;
        let roots = source_roots(root, &config);

        let mut packages: BTreeMap<String, Package> = BTreeMap::new();

        for file in files.sources {
            let Some(name) = package_name(&file, &roots) else {
                debug!(path = %file.display(), "file outside any named package");
                continue;
            };
            package_entry(&mut packages, name).sources.push(file);
        }

        for file in files.directives {
            let Some(name) = package_name(&file, &roots) else {
                debug!(path = %file.display(), "directive outside any named package");
                continue;
            };
            let directive = match read_directive(&file) {
                Ok(directive) => directive,
                Err(err) => {
                    warn!("{err:#}. Treating the package as having no directive.");
                    None
                }
            };
            let package = package_entry(&mut packages, name);
            package.directive_file = Some(file);
            package.directive = directive;
        }

        let ignore_targets = config
            .ignore_targets
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(p) => Some(p),
                Err(err) => {
                    warn!("invalid ignore_targets pattern {pattern:?}: {err}");
                    None
                }
            })
            .collect();

        let externals = config
            .external_packages
            .iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();

        info!(
            packages = packages.len(),
            "discovered packages under {}",
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            config,
            packages,
            externals,
            ignore_targets,
        })
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// All packages, ordered by name.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Packages owning at least one source file; these are the ones analysed.
    pub fn source_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values().filter(|p| !p.sources.is_empty())
    }

    /// Whether uses of `target` are never recorded.
    pub fn is_ignored_target(&self, target: &str) -> bool {
        self.ignore_targets.iter().any(|p| p.matches(target))
    }

    /// Map a dotted reference to the deepest existing package containing it:
    /// `app.core.Service` resolves to `app.core` if that package exists.
    pub fn resolve_reference(&self, reference: &str) -> Option<String> {
        let mut current = reference;
        loop {
            if let Some(found) = self.resolve_package(current) {
                return Some(found);
            }
            let idx = current.rfind('.')?;
            current = &current[..idx];
        }
    }

    /// Where `package` declares `target` in its directive.
    pub fn directive_site(&self, package: &str, target: &str) -> Option<SourceSite> {
        let directive = self.packages.get(package)?.directive.as_ref()?;
        Some(directive.site_of(target))
    }
}

impl PackageIndex for Project {
    fn resolve_package(&self, name: &str) -> Option<String> {
        (self.packages.contains_key(name) || self.externals.contains(name)).then(|| name.to_owned())
    }

    fn read_directive(&self, package: &str) -> Option<&[String]> {
        self.packages
            .get(package)?
            .directive
            .as_ref()
            .map(|d| d.targets())
    }
}

fn package_entry(packages: &mut BTreeMap<String, Package>, name: String) -> &mut Package {
    packages.entry(name.clone()).or_insert_with(|| Package {
        name,
        ..Package::default()
    })
}

/// Absolute source roots, most specific first.
fn source_roots(root: &Path, config: &FenceConfig) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = config
        .source_roots
        .iter()
        .map(|r| root.join(r))
        .collect();
    roots.sort_by_key(|r| std::cmp::Reverse(r.components().count()));
    roots
}

/// The dotted package name of the directory containing `file`, relative to
/// the first source root that contains it. `None` for the unnamed package.
fn package_name(file: &Path, roots: &[PathBuf]) -> Option<String> {
    let dir = file.parent()?;
    let relative = roots.iter().find_map(|root| dir.strip_prefix(root).ok())?;

    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    let segments = segments?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("."))
}
