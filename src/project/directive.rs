use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use super::SourceSite;

/// On-disk shape of a directive file.
#[derive(Debug, Deserialize)]
struct DirectiveFile {
    allow: Option<Vec<toml::Spanned<String>>>,
}

/// One declared target and where it is written.
#[derive(Debug, Clone)]
pub struct DirectiveEntry {
    pub target: String,
    pub line: usize,
    pub col: usize,
}

/// A package's declared allow-list, as read from its directive file.
#[derive(Debug, Clone)]
pub struct Directive {
    pub path: PathBuf,
    pub entries: Vec<DirectiveEntry>,
    targets: Vec<String>,
}

impl Directive {
    /// Declared target names in declaration order, untrimmed.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Where `target` is declared, or the top of the file if it is not listed.
    pub fn site_of(&self, target: &str) -> SourceSite {
        self.entries
            .iter()
            .find(|entry| entry.target.trim() == target)
            .map(|entry| SourceSite::new(&self.path, entry.line, entry.col))
            .unwrap_or_else(|| SourceSite::new(&self.path, 1, 1))
    }
}

/// Parse a directive file.
///
/// Returns `Ok(None)` when the file has no `allow` key: the file then marks
/// the package's declaration but carries no directive.
pub fn read_directive(path: &Path) -> anyhow::Result<Option<Directive>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_directive(path, &contents)
}

pub fn parse_directive(path: &Path, contents: &str) -> anyhow::Result<Option<Directive>> {
    let file: DirectiveFile = toml::from_str(contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let Some(allow) = file.allow else {
        return Ok(None);
    };

    let entries: Vec<DirectiveEntry> = allow
        .into_iter()
        .map(|spanned| {
            let (line, col) = line_col(contents, spanned.span().start);
            DirectiveEntry {
                target: spanned.into_inner(),
                line,
                col,
            }
        })
        .collect();
    let targets = entries.iter().map(|e| e.target.clone()).collect();

    Ok(Some(Directive {
        path: path.to_path_buf(),
        entries,
        targets,
    }))
}

/// 1-based line and column of byte `offset` in `text`.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}
