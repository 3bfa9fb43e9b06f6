/// Integration test suite: builds small fixture projects in temp directories and runs
/// the compiled `depfence` binary against them.
///
/// The `CARGO_BIN_EXE_depfence` environment variable is set by Cargo during `cargo test`
/// to point to the compiled binary for the current profile (debug or release).
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_depfence"))
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A project where `source` may depend on `target`, with a Java source file body of choice.
fn fixture(source_allow: Option<&str>, source_body: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    if let Some(allow) = source_allow {
        write(dir.path(), "source/package-deps.toml", allow);
    }
    write(dir.path(), "source/Source.java", source_body);
    write(dir.path(), "target/package-deps.toml", "allow = []\n");
    write(
        dir.path(),
        "target/Target.java",
        "package target;\n\npublic interface Target {\n}\n",
    );
    dir
}

fn run(args: &[&str]) -> (bool, String, String) {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke depfence binary");
    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).to_string(),
        String::from_utf8_lossy(&out.stderr).to_string(),
    )
}

/// Run a depfence command and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(args: &[&str]) -> String {
    let (ok, stdout, stderr) = run(args);
    assert!(
        ok,
        "command {:?} failed\nstdout: {}\nstderr: {}",
        args, stdout, stderr
    );
    stdout
}

/// Run a depfence command and assert it exits with a non-zero status.
/// Returns (stdout, stderr) as Strings.
fn run_failure(args: &[&str]) -> (String, String) {
    let (ok, stdout, stderr) = run(args);
    assert!(
        !ok,
        "command {:?} expected to fail but exited successfully\nstdout: {}\nstderr: {}",
        args, stdout, stderr
    );
    (stdout, stderr)
}

fn path_str(dir: &TempDir) -> &str {
    dir.path().to_str().unwrap()
}

const USES_TARGET: &str = "package source;\n\nimport target.Target;\n\npublic class Source {\n    private Target target;\n}\n";

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn test_check_allowed_dependency_is_clean() {
    let dir = fixture(Some("allow = [\"target\"]\n"), USES_TARGET);
    let stdout = run_success(&["check", path_str(&dir)]);
    assert!(stdout.trim().is_empty(), "no diagnostics expected\n{stdout}");
}

#[test]
fn test_check_forbidden_dependency_fails() {
    let dir = fixture(Some("allow = []\n"), USES_TARGET);
    let (stdout, stderr) = run_failure(&["check", path_str(&dir)]);

    assert!(
        stdout.contains("source/Source.java:3:8 error: Forbidden dependency on [target]"),
        "stdout: {stdout}"
    );
    assert!(stderr.contains("1 error(s)"), "stderr: {stderr}");
}

#[test]
fn test_check_unused_dependency_only_warns() {
    let dir = fixture(
        Some("allow = [\"target\"]\n"),
        "package source;\n\npublic class Source {\n}\n",
    );
    let stdout = run_success(&["check", path_str(&dir)]);
    assert!(
        stdout.contains("source/package-deps.toml:1:")
            && stdout.contains("warning: Unused dependency on [target]"),
        "stdout: {stdout}"
    );
}

#[test]
fn test_check_missing_directive_only_warns() {
    let dir = fixture(None, USES_TARGET);
    let stdout = run_success(&["check", path_str(&dir)]);
    assert!(
        stdout.contains("source/Source.java:1:1 warning: no dependency directive"),
        "stdout: {stdout}"
    );
    assert!(!stdout.contains("Forbidden"), "inferred uses are not errors");
}

#[test]
fn test_check_invalid_and_cyclic_directive_entries() {
    let dir = fixture(
        Some("allow = [\"source\", \"undefined\", \"target\"]\n"),
        USES_TARGET,
    );
    let (stdout, _) = run_failure(&["check", path_str(&dir)]);
    assert!(
        stdout.contains("error: Cyclic dependency declared on [source]"),
        "stdout: {stdout}"
    );
    assert!(
        stdout.contains("error: Invalid dependency directive: unknown package [undefined]"),
        "stdout: {stdout}"
    );
}

#[test]
fn test_check_json_output() {
    let dir = fixture(Some("allow = []\n"), USES_TARGET);
    let (stdout, _) = run_failure(&["check", "--format", "json", path_str(&dir)]);

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("check --format json output is not valid JSON");
    let diags = parsed["diagnostics"]
        .as_array()
        .expect("JSON missing 'diagnostics' array");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0]["severity"], "error");
    assert_eq!(diags[0]["file"], "source/Source.java");
    assert_eq!(diags[0]["line"], 3);
    assert_eq!(parsed["stats"]["errors"], 1);
    assert_eq!(parsed["stats"]["edges"]["forbidden"], 1);
}

#[test]
fn test_check_uses_external_packages_from_config() {
    let dir = fixture(
        Some("allow = [\"target\", \"java.util\"]\n"),
        "package source;\nimport target.Target;\nimport java.util.List;\nimport java.math.BigDecimal;\n",
    );
    write(
        dir.path(),
        "depfence.toml",
        "external_packages = [\"java.util\", \"java.math\"]\n",
    );

    let (stdout, _) = run_failure(&["check", path_str(&dir)]);
    assert!(
        stdout.contains("error: Forbidden dependency on [java.math]"),
        "stdout: {stdout}"
    );
    assert!(!stdout.contains("[java.util]"), "stdout: {stdout}");
}

#[test]
fn test_check_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let (_, stderr) = run_failure(&["check", missing.to_str().unwrap()]);
    assert!(stderr.contains("not a directory"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// edges / allowed / cycles
// ---------------------------------------------------------------------------

#[test]
fn test_edges_lists_classified_edges() {
    let dir = fixture(Some("allow = [\"target\"]\n"), USES_TARGET);
    let stdout = run_success(&["edges", path_str(&dir)]);
    assert!(stdout.contains("primary source -> target"), "stdout: {stdout}");
    assert!(stdout.contains("1 edges"), "stdout: {stdout}");
}

#[test]
fn test_edges_kind_filter_and_json() {
    let dir = fixture(Some("allow = []\n"), USES_TARGET);
    let stdout = run_success(&["edges", "--kind", "forbidden", "--format", "json", path_str(&dir)]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let edges = parsed.as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["kind"], "forbidden");
    assert_eq!(edges[0]["used"], true);
    assert_eq!(edges[0]["origin"]["line"], 3);
}

#[test]
fn test_edges_unknown_kind_is_rejected() {
    let dir = fixture(Some("allow = []\n"), USES_TARGET);
    let (_, stderr) = run_failure(&["edges", "--kind", "allowed", path_str(&dir)]);
    assert!(stderr.contains("unknown dependency kind"), "stderr: {stderr}");
}

#[test]
fn test_edges_unused_filter() {
    let dir = fixture(
        Some("allow = [\"target\"]\n"),
        "package source;\npublic class Source {}\n",
    );
    let stdout = run_success(&["edges", "--unused", path_str(&dir)]);
    assert!(stdout.contains("primary source -> target unused"), "stdout: {stdout}");
}

#[test]
fn test_allowed_shows_primary_and_inherited() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app/package-deps.toml", "allow = [\"lib\"]\n");
    write(dir.path(), "app/web/package-deps.toml", "allow = [\"util\", \"ghost\"]\n");
    write(dir.path(), "app/web/Web.java", "package app.web;\n");
    write(dir.path(), "lib/Lib.java", "package lib;\n");
    write(dir.path(), "util/Util.java", "package util;\n");

    let stdout = run_success(&["allowed", "app.web", path_str(&dir)]);
    assert!(stdout.contains("primary util"), "stdout: {stdout}");
    assert!(stdout.contains("secondary lib"), "stdout: {stdout}");
    assert!(
        stdout.contains("invalid ghost (declared by app.web)"),
        "stdout: {stdout}"
    );
}

#[test]
fn test_allowed_unknown_package_fails() {
    let dir = fixture(None, USES_TARGET);
    let (_, stderr) = run_failure(&["allowed", "nowhere", path_str(&dir)]);
    assert!(stderr.contains("unknown package"), "stderr: {stderr}");
}

#[test]
fn test_cycles_between_packages() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a/A.java", "package a;\nimport b.B;\n");
    write(dir.path(), "b/B.java", "package b;\nimport a.A;\n");
    write(dir.path(), "c/C.java", "package c;\nimport a.A;\n");

    let stdout = run_success(&["cycles", path_str(&dir)]);
    assert!(stdout.contains("cycle a -> b -> a"), "stdout: {stdout}");
    assert!(stdout.contains("1 cycles found"), "stdout: {stdout}");
}
