use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Name of the configuration file looked up at the project root.
pub const CONFIG_FILE: &str = "depfence.toml";

/// Default per-package directive file name.
pub const DEFAULT_DIRECTIVE_FILE: &str = "package-deps.toml";

/// Configuration loaded from `depfence.toml` at the project root.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FenceConfig {
    /// Directories (relative to the project root) whose subdirectories are packages.
    pub source_roots: Vec<String>,
    /// Extensions of source files scanned for references.
    pub extensions: Vec<String>,
    /// File name of the per-package dependency directive.
    pub directive_file: String,
    /// Additional path patterns to exclude from the walk (beyond .gitignore).
    pub exclude: Option<Vec<String>>,
    /// Packages that exist outside the scanned tree and may be declared as targets.
    pub external_packages: Vec<String>,
    /// Glob patterns of target packages whose uses are never recorded.
    pub ignore_targets: Vec<String>,
    /// Also warn about unused dependencies inherited from an ancestor's directive.
    pub report_unused_inherited: bool,
    /// Patterns that find package references in source lines.
    #[serde(rename = "reference")]
    pub references: Vec<ReferencePattern>,
}

/// One reference-extraction rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferencePattern {
    /// Regex applied per line; the referenced name is capture group `path` if
    /// present, otherwise group 1.
    pub pattern: String,
    /// Segment separator used by the referenced names (replaced by `.`).
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    ".".to_owned()
}

impl ReferencePattern {
    /// `import a.b.C;`, `import static a.b.C.m;` and `import a.b.*;`.
    pub fn java_import() -> Self {
        Self {
            pattern: r"^\s*import\s+(?:static\s+)?(?P<path>[\w.]+?)(?:\.\*)?\s*;".to_owned(),
            separator: default_separator(),
        }
    }
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            source_roots: vec![".".to_owned()],
            extensions: vec!["java".to_owned()],
            directive_file: DEFAULT_DIRECTIVE_FILE.to_owned(),
            exclude: None,
            external_packages: Vec::new(),
            ignore_targets: Vec::new(),
            report_unused_inherited: false,
            references: vec![ReferencePattern::java_import()],
        }
    }
}

impl FenceConfig {
    /// Load configuration from `depfence.toml` in the given root directory.
    ///
    /// Returns a default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}
