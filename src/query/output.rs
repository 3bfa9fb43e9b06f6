use std::io::IsTerminal;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::deps::{AllowListResolution, DependencyEdge};
use crate::diagnostics::{Diagnostic, Severity};
use crate::output::CheckStats;
use crate::project::SourceSite;
use crate::query::cycles::PackageCycle;

fn site_str(site: Option<&SourceSite>, root: &Path) -> String {
    site.map(|s| s.relative_to(root).to_string())
        .unwrap_or_else(|| "-".to_owned())
}

/// Format and print diagnostics to stdout according to the selected output format.
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    stats: &CheckStats,
    format: &OutputFormat,
    project_root: &Path,
) {
    match format {
        OutputFormat::Compact => {
            for d in diagnostics {
                println!(
                    "{} {}: {}",
                    site_str(d.site.as_ref(), project_root),
                    d.severity.as_str(),
                    d.message
                );
            }
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();

            let site_w = diagnostics
                .iter()
                .map(|d| site_str(d.site.as_ref(), project_root).len())
                .max()
                .unwrap_or(8)
                .max(8);

            let header = format!("{:<site_w$}  {:<7}  MESSAGE", "LOCATION", "LEVEL");
            if use_color {
                println!("\x1b[1m{header}\x1b[0m");
            } else {
                println!("{header}");
            }
            println!("{}", "-".repeat(site_w + 18));

            for d in diagnostics {
                let level = d.severity.as_str();
                let level = if use_color {
                    match d.severity {
                        Severity::Error => format!("\x1b[31m{level:<7}\x1b[0m"),
                        Severity::Warning => format!("\x1b[33m{level:<7}\x1b[0m"),
                    }
                } else {
                    format!("{level:<7}")
                };
                println!(
                    "{:<site_w$}  {}  {}",
                    site_str(d.site.as_ref(), project_root),
                    level,
                    d.message,
                );
            }
        }

        OutputFormat::Json => {
            let json_diags: Vec<serde_json::Value> = diagnostics
                .iter()
                .map(|d| {
                    let site = d.site.as_ref().map(|s| s.relative_to(project_root));
                    serde_json::json!({
                        "severity": d.severity,
                        "file": site.as_ref().map(|s| s.file.to_string_lossy().into_owned()),
                        "line": site.as_ref().map(|s| s.line),
                        "col": site.as_ref().map(|s| s.col),
                        "message": d.message,
                    })
                })
                .collect();
            let report = serde_json::json!({
                "diagnostics": json_diags,
                "stats": stats,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_default()
            );
        }
    }
}

/// Format and print classified edges to stdout.
pub fn format_edges(
    edges: &[&DependencyEdge<SourceSite>],
    format: &OutputFormat,
    project_root: &Path,
) {
    match format {
        OutputFormat::Compact => {
            for e in edges {
                let mut line = format!("{} {} -> {}", e.kind(), e.source, e.target);
                if !e.used {
                    line.push_str(" unused");
                }
                if let Some(site) = &e.origin {
                    line.push_str(&format!(" {}", site.relative_to(project_root)));
                }
                println!("{line}");
            }
            println!("{} edges", edges.len());
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();
            let src_w = edges.iter().map(|e| e.source.len()).max().unwrap_or(6).max(6);
            let tgt_w = edges.iter().map(|e| e.target.len()).max().unwrap_or(6).max(6);

            let header = format!(
                "{:<9}  {:<src_w$}  {:<tgt_w$}  {:<4}  ORIGIN",
                "KIND", "SOURCE", "TARGET", "USED"
            );
            if use_color {
                println!("\x1b[1m{header}\x1b[0m");
            } else {
                println!("{header}");
            }
            println!("{}", "-".repeat(src_w + tgt_w + 30));

            for e in edges {
                println!(
                    "{:<9}  {:<src_w$}  {:<tgt_w$}  {:<4}  {}",
                    e.kind().as_str(),
                    e.source,
                    e.target,
                    if e.used { "yes" } else { "no" },
                    site_str(e.origin.as_ref(), project_root),
                );
            }
        }

        OutputFormat::Json => {
            let json_edges: Vec<serde_json::Value> = edges
                .iter()
                .map(|e| {
                    let origin = e.origin.as_ref().map(|s| s.relative_to(project_root));
                    serde_json::json!({
                        "kind": e.kind(),
                        "source": e.source,
                        "target": e.target,
                        "used": e.used,
                        "origin": origin,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json_edges).unwrap_or_default()
            );
        }
    }
}

/// Format and print the effective allow-list of one package.
pub fn format_allowed(package: &str, resolution: &AllowListResolution, format: &OutputFormat) {
    let secondary = resolution.secondary();

    match format {
        OutputFormat::Compact | OutputFormat::Table => {
            if !resolution.has_directive() {
                println!("{package}: no dependency directive");
            }
            if let Some(primary) = &resolution.primary {
                for target in primary {
                    println!("primary {target}");
                }
            }
            for target in &secondary {
                println!("secondary {target}");
            }
            for invalid in &resolution.invalid {
                println!("invalid {} (declared by {})", invalid.target, invalid.declared_by);
            }
        }

        OutputFormat::Json => {
            let json = serde_json::json!({
                "package": package,
                "has_directive": resolution.has_directive(),
                "primary": resolution.primary,
                "secondary": secondary,
                "invalid": resolution.invalid,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

/// Format and print package cycles to stdout.
pub fn format_cycles(cycles: &[PackageCycle], format: &OutputFormat) {
    match format {
        OutputFormat::Compact | OutputFormat::Table => {
            for c in cycles {
                println!("cycle {}", c.packages.join(" -> "));
            }
            println!("{} cycles found", cycles.len());
        }

        OutputFormat::Json => {
            let json: Vec<&Vec<String>> = cycles.iter().map(|c| &c.packages).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}
