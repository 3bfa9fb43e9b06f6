use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::FenceConfig;

/// Files discovered under the project root.
#[derive(Debug, Default)]
pub struct WalkedFiles {
    /// Source files whose extension is configured.
    pub sources: Vec<PathBuf>,
    /// Per-package directive files.
    pub directives: Vec<PathBuf>,
}

/// Walk a project directory and collect source files and directive files.
///
/// Respects `.gitignore` rules and applies any additional exclusions from
/// `config.exclude`. Results are sorted so that analysis output is stable.
///
/// When `verbose` is true, each discovered file path is printed to stderr.
pub fn walk_project(
    root: &Path,
    config: &FenceConfig,
    verbose: bool,
) -> anyhow::Result<WalkedFiles> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut files = WalkedFiles::default();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }

        let is_directive = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == config.directive_file);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let is_source = config.extensions.iter().any(|e| e == ext);

        if !is_directive && !is_source {
            continue;
        }

        if verbose {
            eprintln!("{}", path.display());
        }

        if is_directive {
            files.directives.push(path.to_path_buf());
        } else {
            files.sources.push(path.to_path_buf());
        }
    }

    files.sources.sort();
    files.directives.sort();
    Ok(files)
}

/// Returns true if `path` matches any exclusion pattern from config.
fn is_excluded_by_config(path: &Path, config: &FenceConfig) -> bool {
    let patterns = match &config.exclude {
        Some(p) => p,
        None => return false,
    };

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        let Ok(matcher) = glob::Pattern::new(pattern) else {
            continue;
        };
        if matcher.matches(&path_str) {
            return true;
        }
        // Also check if any component matches the pattern directly.
        if path
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|s| matcher.matches(s))
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_walk_splits_sources_and_directives() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("app/core")).unwrap();
        fs::write(dir.path().join("app/core/Core.java"), "package app.core;").unwrap();
        fs::write(dir.path().join("app/core/package-deps.toml"), "allow = []").unwrap();
        fs::write(dir.path().join("app/README.md"), "# app").unwrap();

        let files = walk_project(dir.path(), &FenceConfig::default(), false).unwrap();

        assert_eq!(names(&files.sources, dir.path()), vec!["app/core/Core.java"]);
        assert_eq!(
            names(&files.directives, dir.path()),
            vec!["app/core/package-deps.toml"]
        );
    }

    #[test]
    fn test_walk_respects_exclude_patterns() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("generated")).unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("generated/Gen.java"), "").unwrap();
        fs::write(dir.path().join("app/App.java"), "").unwrap();

        let config = FenceConfig {
            exclude: Some(vec!["generated".to_string()]),
            ..FenceConfig::default()
        };
        let files = walk_project(dir.path(), &config, false).unwrap();

        assert_eq!(names(&files.sources, dir.path()), vec!["app/App.java"]);
    }

    #[test]
    fn test_walk_respects_gitignore() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("build/out")).unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::write(dir.path().join("build/out/Out.java"), "").unwrap();
        fs::write(dir.path().join("Main.java"), "").unwrap();

        let files = walk_project(dir.path(), &FenceConfig::default(), false).unwrap();
        assert_eq!(names(&files.sources, dir.path()), vec!["Main.java"]);
    }

    #[test]
    fn test_walk_uses_configured_extensions() {
        let dir = tmp();
        fs::write(dir.path().join("lib.rs"), "").unwrap();
        fs::write(dir.path().join("Main.java"), "").unwrap();

        let config = FenceConfig {
            extensions: vec!["rs".to_string()],
            ..FenceConfig::default()
        };
        let files = walk_project(dir.path(), &config, false).unwrap();
        assert_eq!(names(&files.sources, dir.path()), vec!["lib.rs"]);
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        let dir = tmp();
        let missing = dir.path().join("nope");
        assert!(walk_project(&missing, &FenceConfig::default(), false).is_err());
    }
}
