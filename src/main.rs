mod analysis;
mod cli;
mod config;
mod deps;
mod diagnostics;
mod output;
mod project;
mod query;
mod walker;

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use analysis::analyze;
use cli::{Cli, Commands};
use deps::{DependencyKind, DirectiveResolver, PackageIndex};
use diagnostics::Severity;
use output::{CheckStats, print_summary};
use project::Project;
use query::cycles::find_package_cycles;
use query::output::{format_allowed, format_cycles, format_diagnostics, format_edges};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Check {
            path,
            verbose,
            format,
        } => {
            let start = Instant::now();
            let project = Project::load(&path, verbose)?;
            let analysis = analyze(&project)?;
            let diagnostics = diagnostics::collect(&analysis.registry, &project);

            let stats = CheckStats {
                packages: project.packages().count(),
                packages_scanned: analysis.packages_scanned,
                references: analysis.references,
                edges: analysis.registry.count_by_kind(),
                directive_less: analysis.registry.directive_less().len(),
                errors: diagnostics::count(&diagnostics, Severity::Error),
                warnings: diagnostics::count(&diagnostics, Severity::Warning),
                elapsed_secs: start.elapsed().as_secs_f64(),
            };

            format_diagnostics(&diagnostics, &stats, &format, &project.root);
            print_summary(&stats);

            if stats.errors > 0 {
                anyhow::bail!("{} dependency error(s) found", stats.errors);
            }
        }

        Commands::Edges {
            path,
            kind,
            unused,
            format,
        } => {
            let kinds = kind
                .iter()
                .map(|name| {
                    DependencyKind::from_name(name)
                        .ok_or_else(|| anyhow::anyhow!("unknown dependency kind {name:?}"))
                })
                .collect::<Result<Vec<_>>>()?;

            let project = Project::load(&path, false)?;
            let analysis = analyze(&project)?;

            let edges: Vec<_> = if unused {
                analysis.registry.unused().collect()
            } else {
                analysis.registry.edges().iter().collect()
            };
            let edges: Vec<_> = edges
                .into_iter()
                .filter(|e| kinds.is_empty() || kinds.contains(&e.kind()))
                .collect();

            format_edges(&edges, &format, &project.root);
        }

        Commands::Allowed {
            package,
            path,
            format,
        } => {
            let project = Project::load(&path, false)?;
            if project.resolve_package(&package).is_none() {
                anyhow::bail!("unknown package {package:?} under {}", path.display());
            }
            let resolution = DirectiveResolver::new(&project).resolve(&package);
            format_allowed(&package, &resolution, &format);
        }

        Commands::Cycles { path, format } => {
            let project = Project::load(&path, false)?;
            let analysis = analyze(&project)?;
            let cycles = find_package_cycles(&analysis.registry);
            format_cycles(&cycles, &format);
        }
    }

    Ok(())
}
