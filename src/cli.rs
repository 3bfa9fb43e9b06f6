use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Package boundary checker.
///
/// depfence reads the dependency allow-list each package declares in its
/// directive file, matches it against the dependencies found in the sources,
/// and reports forbidden, unused, invalid and self-referential dependencies.
#[derive(Parser, Debug)]
#[command(
    name = "depfence",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error) or a full tracing filter.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-result format, `file:line:col level: message` (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every package against its dependency directive.
    ///
    /// Exits with a non-zero status if any error is reported.
    Check {
        /// Path to the project root.
        path: PathBuf,

        /// Print each discovered file path during the walk.
        #[arg(short, long)]
        verbose: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// List every classified dependency edge.
    Edges {
        /// Path to the project root.
        path: PathBuf,

        /// Filter by kind (comma-separated: primary,secondary,invalid,forbidden,inferred,cycle).
        #[arg(long, value_delimiter = ',')]
        kind: Vec<String>,

        /// Only show declared dependencies that were never used.
        #[arg(long)]
        unused: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Show the effective allow-list of one package (own and inherited entries).
    Allowed {
        /// Fully-qualified package name (e.g. "com.example.api").
        package: String,

        /// Path to the project root.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Detect cycles between packages over the observed dependencies.
    ///
    /// Uses Kosaraju's SCC algorithm. Each reported cycle is a set of packages
    /// that depend on each other directly or transitively.
    Cycles {
        /// Path to the project root.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },
}
