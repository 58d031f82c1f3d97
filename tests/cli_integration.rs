//! Integration tests for the `della` CLI.
//!
//! Each test creates a temp directory, runs `della` as a subprocess, and
//! verifies stdout and/or file contents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Path to the built `della` binary.
fn della_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_della"))
}

/// Create a config and a small tasks file in the given directory.
fn create_test_tasks(root: &Path) {
    fs::write(root.join("della.toml"), "[tasks]\nfile = \"tasks.toml\"\n").unwrap();
    fs::write(
        root.join("tasks.toml"),
        r#"content = "Home"
due_date = ""

[[subnodes]]
content = "Kitchen"
due_date = ""

[[subnodes.subnodes]]
content = "Buy milk"
due_date = "2024-01-01"
unique_id = "MILK"

[[subnodes]]
content = "Garden"
due_date = ""
"#,
    )
    .unwrap();
}

fn run_della(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(della_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("DELLA_LOG")
        .output()
        .expect("failed to run della");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `della` expecting success, return stdout.
fn run_della_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_della(dir, args);
    if !success {
        panic!(
            "della {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `della` expecting failure, return stderr.
fn run_della_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_della(dir, args);
    if success {
        panic!("della {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_show_tree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["show"]);
    assert_eq!(
        out,
        "Home\n  Kitchen (kitchen)\n    Buy milk [2024-01-01] (MILK)\n  Garden (garden)\n"
    );
}

#[test]
fn test_show_json_subtree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["show", "kitchen", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["content"], "Kitchen");
    assert_eq!(value["subnodes"][0]["due_date"], "2024-01-01");
}

#[test]
fn test_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["path", "kitchen/MILK"]);
    assert_eq!(out, "Home/Kitchen/Buy milk\n");
}

#[test]
fn test_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_della_err(tmp.path(), &["show"]);
    assert!(err.contains("tasks file not found"));
}

#[test]
fn test_config_found_from_subdirectory() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());
    let sub = tmp.path().join("deep/er");
    fs::create_dir_all(&sub).unwrap();

    let out = run_della_ok(&sub, &["path", "garden"]);
    assert_eq!(out, "Home/Garden\n");
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[test]
fn test_complete() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    assert_eq!(run_della_ok(tmp.path(), &["complete", ""]), "kitchen\ngarden\n");
    assert_eq!(run_della_ok(tmp.path(), &["complete", "#ga"]), "garden\n");
    assert_eq!(run_della_ok(tmp.path(), &["complete", "kitchen/"]), "MILK\n");
    assert_eq!(
        run_della_ok(tmp.path(), &["complete", "", "--base", "garden"]),
        ""
    );
}

#[test]
fn test_complete_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["--json", "complete", "ki", "--all"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["fallback"], false);
    assert_eq!(value["fragment"], "ki");
    assert_eq!(value["candidates"], serde_json::json!(["kitchen", "garden"]));

    let out = run_della_ok(tmp.path(), &["--json", "complete", "a#b"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["fallback"], true);
}

// ---------------------------------------------------------------------------
// Write command tests
// ---------------------------------------------------------------------------

#[test]
fn test_init() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_della_ok(tmp.path(), &["init", "Home"]);
    assert!(out.contains("Initialized"));
    assert!(tmp.path().join("della.toml").exists());
    assert_eq!(run_della_ok(tmp.path(), &["show"]), "Home\n");

    let err = run_della_err(tmp.path(), &["init", "Again"]);
    assert!(err.contains("already exists"));
    run_della_ok(tmp.path(), &["init", "Again", "--force"]);
    assert_eq!(run_della_ok(tmp.path(), &["show"]), "Again\n");
}

#[test]
fn test_add_and_date() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(
        tmp.path(),
        &["add", "garden", "Plant tomatoes", "--due", "2025-05-01", "--id", "TOM"],
    );
    assert_eq!(out, "garden/TOM\n");

    run_della_ok(tmp.path(), &["date", "garden/TOM", "none"]);
    run_della_ok(tmp.path(), &["title", "garden/TOM", "Plant beans"]);
    let out = run_della_ok(tmp.path(), &["show", "garden"]);
    assert_eq!(out, "Garden (garden)\n  Plant beans (TOM)\n");

    let written = fs::read_to_string(tmp.path().join("tasks.toml")).unwrap();
    assert!(written.contains("parent = \"Garden\""));
    assert!(written.contains("unique_id = \"TOM\""));
}

#[test]
fn test_add_duplicate_id_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());
    let before = fs::read_to_string(tmp.path().join("tasks.toml")).unwrap();

    let err = run_della_err(tmp.path(), &["add", "/", "More milk", "--id", "MILK"]);
    assert!(err.contains("duplicate unique id: MILK"));
    let after = fs::read_to_string(tmp.path().join("tasks.toml")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_add_rejects_path_syntax_in_id() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let err = run_della_err(tmp.path(), &["add", "/", "Shed", "--id", "a/b"]);
    assert!(err.contains("invalid unique id"));
    let err = run_della_err(tmp.path(), &["id", "garden", ".."]);
    assert!(err.contains("invalid unique id"));
}

#[test]
fn test_clashing_titles_stay_addressable() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    run_della_ok(tmp.path(), &["add", "/", "  garden  "]);
    assert_eq!(run_della_ok(tmp.path(), &["complete", "gar"]), "garden\ngarden~2\n");
    run_della_ok(tmp.path(), &["date", "garden~2", "2025-01-01"]);
    let out = run_della_ok(tmp.path(), &["show", "garden~2"]);
    assert_eq!(out, "garden [2025-01-01] (garden~2)\n");
}

#[test]
fn test_mv() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["mv", "kitchen/MILK", "garden"]);
    assert_eq!(out, "Home/Garden/Buy milk\n");

    let err = run_della_err(tmp.path(), &["mv", "garden/MILK", "garden"]);
    assert!(err.contains("already a subnode"));

    let err = run_della_err(tmp.path(), &["mv", "garden", "garden/MILK"]);
    assert!(err.contains("descendant"));
}

#[test]
fn test_rm_logs_recovery() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let out = run_della_ok(tmp.path(), &["rm", "kitchen"]);
    assert_eq!(out, "removed Home/Kitchen\n");
    assert_eq!(run_della_ok(tmp.path(), &["show"]), "Home\n  Garden (garden)\n");

    let log = run_della_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("Home/Kitchen detached"));
    assert!(log.contains("Buy milk"));

    let err = run_della_err(tmp.path(), &["rm", "/"]);
    assert!(err.contains("no parent"));
}

#[test]
fn test_shell_session() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_tasks(tmp.path());

    let mut child = Command::new(della_bin())
        .arg("shell")
        .current_dir(tmp.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"cd garden\nadd \"Mow the lawn\"\npwd\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Home/Garden/Mow the lawn"));
    assert!(stdout.contains("saved"));

    let out = run_della_ok(tmp.path(), &["path", "garden/mow-the-lawn"]);
    assert_eq!(out, "Home/Garden/Mow the lawn\n");
}
