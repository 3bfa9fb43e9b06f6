use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use super::{Project, SourceSite};
use crate::config::ReferencePattern;

/// A raw match in one source file, before package resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub line: usize,
    pub col: usize,
    /// Referenced name, dot-separated.
    pub name: String,
}

/// An observed dependency of one package on another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub source: String,
    pub site: SourceSite,
    pub target: String,
}

struct CompiledPattern {
    regex: Regex,
    separator: String,
}

/// Finds package references in source text with the configured patterns.
pub struct ReferenceExtractor {
    patterns: Vec<CompiledPattern>,
}

impl ReferenceExtractor {
    pub fn new(patterns: &[ReferencePattern]) -> anyhow::Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let regex = Regex::new(&p.pattern)
                    .with_context(|| format!("invalid reference pattern {:?}", p.pattern))?;
                Ok(CompiledPattern {
                    regex,
                    separator: p.separator.clone(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Every match of every pattern, line by line.
    pub fn extract(&self, text: &str) -> Vec<RawReference> {
        let mut found = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            for pattern in &self.patterns {
                for caps in pattern.regex.captures_iter(line) {
                    let Some(m) = caps.name("path").or_else(|| caps.get(1)) else {
                        continue;
                    };
                    let name = normalize(m.as_str(), &pattern.separator);
                    if name.is_empty() {
                        continue;
                    }
                    found.push(RawReference {
                        line: idx + 1,
                        col: line[..m.start()].chars().count() + 1,
                        name,
                    });
                }
            }
        }
        found
    }
}

/// Rewrite `name` to dot-separated segments, dropping empty ones.
fn normalize(name: &str, separator: &str) -> String {
    let segments: Vec<&str> = if separator.is_empty() || separator == "." {
        name.split('.').collect()
    } else {
        name.split(separator).collect()
    };
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

impl Project {
    /// Extract every observed cross-package reference from the project's sources.
    ///
    /// Files are read and matched in parallel; the result is sorted by source
    /// package, then site, so feeding it to a registry is deterministic.
    pub fn collect_references(&self, extractor: &ReferenceExtractor) -> Vec<Reference> {
        let files: Vec<(&str, &Path)> = self
            .source_packages()
            .flat_map(|p| p.sources.iter().map(move |f| (p.name.as_str(), f.as_path())))
            .collect();

        let mut references: Vec<Reference> = files
            .par_iter()
            .flat_map_iter(|&(package, file)| self.references_in(extractor, package, file))
            .collect();

        references.sort();
        references
    }

    fn references_in(
        &self,
        extractor: &ReferenceExtractor,
        package: &str,
        file: &Path,
    ) -> Vec<Reference> {
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                warn!("skipping {}: {err}", file.display());
                return Vec::new();
            }
        };

        extractor
            .extract(&text)
            .into_iter()
            .filter_map(|raw| {
                let Some(target) = self.resolve_reference(&raw.name) else {
                    debug!(reference = %raw.name, file = %file.display(), "unresolved reference");
                    return None;
                };
                if target == package || self.is_ignored_target(&target) {
                    return None;
                }
                Some(Reference {
                    source: package.to_owned(),
                    site: SourceSite::new(file, raw.line, raw.col),
                    target,
                })
            })
            .collect()
    }
}
